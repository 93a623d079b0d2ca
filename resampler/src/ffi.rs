//! Minimal libsoxr bindings used by the soxr backend.

use std::ffi::{c_char, c_double, c_uint, c_ulong, c_void, CStr};

/// `soxr_t`; only ever handled through a pointer.
pub enum Soxr {}

/// `soxr_error_t`: null on success, otherwise a static message.
pub type ErrorPtr = *const c_char;

/// `SOXR_HQ` quality recipe (20-bit precision).
pub const RECIPE_HQ: c_ulong = 4;

/// `SOXR_FLOAT32_I`: interleaved 32-bit float samples.
pub const DATATYPE_F32_INTERLEAVED: c_uint = 0;

#[repr(C)]
pub struct IoSpec {
    pub itype: c_uint,
    pub otype: c_uint,
    pub scale: c_double,
    pub e: *mut c_void,
    pub flags: c_ulong,
}

#[repr(C)]
pub struct QualitySpec {
    pub precision: c_double,
    pub phase_response: c_double,
    /// Passband edge, as a fraction of the lower Nyquist frequency.
    pub passband_end: c_double,
    pub stopband_begin: c_double,
    pub e: *mut c_void,
    pub flags: c_ulong,
}

unsafe extern "C" {
    pub fn soxr_io_spec(itype: c_uint, otype: c_uint) -> IoSpec;

    pub fn soxr_quality_spec(recipe: c_ulong, flags: c_ulong) -> QualitySpec;

    pub fn soxr_create(
        input_rate: c_double,
        output_rate: c_double,
        num_channels: c_uint,
        error: *mut ErrorPtr,
        io_spec: *const IoSpec,
        quality_spec: *const QualitySpec,
        runtime_spec: *const c_void,
    ) -> *mut Soxr;

    /// `ilen`/`olen` and the `*_done` counters are in frames.
    pub fn soxr_process(
        soxr: *mut Soxr,
        input: *const c_void,
        ilen: usize,
        idone: *mut usize,
        output: *mut c_void,
        olen: usize,
        odone: *mut usize,
    ) -> ErrorPtr;

    pub fn soxr_clear(soxr: *mut Soxr) -> ErrorPtr;

    pub fn soxr_delete(soxr: *mut Soxr);
}

/// Converts a soxr status into a `Result`, copying out the message.
pub fn check(err: ErrorPtr) -> Result<(), String> {
    if err.is_null() {
        return Ok(());
    }
    // Safety: soxr error strings are static, NUL-terminated C strings.
    let msg = unsafe { CStr::from_ptr(err) };
    Err(msg.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_spec_hq_recipe() {
        let spec = unsafe { soxr_quality_spec(RECIPE_HQ, 0) };
        assert_eq!(spec.precision, 20.0);
        assert!(spec.passband_end > 0.5 && spec.passband_end < 1.0);
    }

    #[test]
    fn test_io_spec_float32() {
        let spec = unsafe { soxr_io_spec(DATATYPE_F32_INTERLEAVED, DATATYPE_F32_INTERLEAVED) };
        assert_eq!(spec.itype, DATATYPE_F32_INTERLEAVED);
        assert_eq!(spec.otype, DATATYPE_F32_INTERLEAVED);
        assert_eq!(spec.scale, 1.0);
    }
}
