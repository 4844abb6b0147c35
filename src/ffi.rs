//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for filling templates from host
//! applications written in C#, Python, Node.js and the like. Record data is
//! passed as JSON; results come back as JSON strings.

use std::ffi::{c_char, CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr;

use crate::{generate_file, inspect, DataContext, ErrorMode, GenerateOptions, RecordList, Template};
use crate::generator::{generate_batch, BatchOptions};

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct DocfillResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result data (null if failed). Must be freed with `docfill_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `docfill_free_result`.
    pub error: *mut c_char,
}

impl DocfillResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }
}

/// Options for generation via FFI.
#[repr(C)]
pub struct DocfillOptions {
    /// Mark outputs read-only.
    pub read_only: bool,
    /// Abort on malformed loop markers instead of leaving them literal.
    pub strict: bool,
    /// Fill headers and footers too.
    pub headers_footers: bool,
}

impl Default for DocfillOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            strict: false,
            headers_footers: true,
        }
    }
}

impl From<&DocfillOptions> for GenerateOptions {
    fn from(options: &DocfillOptions) -> Self {
        let mode = if options.strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        };
        GenerateOptions::new()
            .with_error_mode(mode)
            .with_read_only(options.read_only)
            .with_headers_footers(options.headers_footers)
    }
}

/// Read a required C string argument.
unsafe fn required_str<'a>(value: *const c_char, name: &str) -> Result<&'a str, String> {
    if value.is_null() {
        return Err(format!("{name} cannot be null"));
    }
    CStr::from_ptr(value)
        .to_str()
        .map_err(|_| format!("Invalid UTF-8 {name}"))
}

/// Fill a template file into an output file.
///
/// `data_json` is a JSON object (one record) or array (record list).
/// On success, `data` holds the generation statistics as JSON.
///
/// # Safety
///
/// All string arguments must be valid null-terminated UTF-8 strings.
/// The returned result must be freed with `docfill_free_result`.
#[no_mangle]
pub unsafe extern "C" fn docfill_generate_file(
    template_path: *const c_char,
    data_json: *const c_char,
    output_path: *const c_char,
    options: DocfillOptions,
) -> DocfillResult {
    let args = (|| {
        Ok::<_, String>((
            required_str(template_path, "template_path")?,
            required_str(data_json, "data_json")?,
            required_str(output_path, "output_path")?,
        ))
    })();
    let (template_path, data_json, output_path) = match args {
        Ok(args) => args,
        Err(e) => return DocfillResult::error(e),
    };

    match generate_file_internal(
        Path::new(template_path),
        data_json,
        Path::new(output_path),
        &options,
    ) {
        Ok(stats) => DocfillResult::success(stats),
        Err(e) => DocfillResult::error(e.to_string()),
    }
}

fn generate_file_internal(
    template_path: &Path,
    data_json: &str,
    output_path: &Path,
    options: &DocfillOptions,
) -> crate::Result<String> {
    let data = DataContext::from_json_str(data_json)?;
    let stats = generate_file(template_path, &data, output_path, options.into())?;
    Ok(serde_json::to_string(&stats)?)
}

/// Generate one document per chunk of `fill_count` records.
///
/// `records_json` must be a JSON array. `name_rule` may be null. On success,
/// `data` holds the batch report as JSON.
///
/// # Safety
///
/// `template_path`, `records_json` and `output_dir` must be valid
/// null-terminated UTF-8 strings; `name_rule` must be null or one.
/// The returned result must be freed with `docfill_free_result`.
#[no_mangle]
pub unsafe extern "C" fn docfill_generate_batch(
    template_path: *const c_char,
    records_json: *const c_char,
    output_dir: *const c_char,
    fill_count: u32,
    name_rule: *const c_char,
    options: DocfillOptions,
) -> DocfillResult {
    let args = (|| {
        Ok::<_, String>((
            required_str(template_path, "template_path")?,
            required_str(records_json, "records_json")?,
            required_str(output_dir, "output_dir")?,
        ))
    })();
    let (template_path, records_json, output_dir) = match args {
        Ok(args) => args,
        Err(e) => return DocfillResult::error(e),
    };
    let name_rule = if name_rule.is_null() {
        None
    } else {
        match CStr::from_ptr(name_rule).to_str() {
            Ok(s) => Some(s),
            Err(_) => return DocfillResult::error("Invalid UTF-8 name_rule".to_string()),
        }
    };

    let mut batch = BatchOptions::new()
        .with_fill_count(fill_count as usize)
        .with_generate_options((&options).into());
    if let Some(rule) = name_rule {
        batch = batch.with_name_rule(rule);
    }

    match generate_batch_internal(
        Path::new(template_path),
        records_json,
        PathBuf::from(output_dir),
        &batch,
    ) {
        Ok(report) => DocfillResult::success(report),
        Err(e) => DocfillResult::error(e.to_string()),
    }
}

fn generate_batch_internal(
    template_path: &Path,
    records_json: &str,
    output_dir: PathBuf,
    options: &BatchOptions,
) -> crate::Result<String> {
    let records = RecordList::from_json_str(records_json)?;
    let template = Template::open(template_path)?;
    let report = generate_batch(&template, &records, output_dir, options)?;
    Ok(serde_json::to_string(&report)?)
}

/// List a template's placeholders, loops and marker problems as JSON.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `docfill_free_result`.
#[no_mangle]
pub unsafe extern "C" fn docfill_inspect(path: *const c_char) -> DocfillResult {
    let path_str = match required_str(path, "Path") {
        Ok(s) => s,
        Err(e) => return DocfillResult::error(e),
    };

    match inspect_internal(Path::new(path_str)) {
        Ok(json) => DocfillResult::success(json),
        Err(e) => DocfillResult::error(e.to_string()),
    }
}

fn inspect_internal(path: &Path) -> crate::Result<String> {
    let summary = inspect(path)?;
    Ok(serde_json::to_string_pretty(&summary)?)
}

/// Check if a file is a DOCX package.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn docfill_is_docx(path: *const c_char) -> bool {
    match required_str(path, "Path") {
        Ok(s) => crate::detect::is_docx(Path::new(s)),
        Err(_) => false,
    }
}

/// Free a result returned by any docfill function.
///
/// # Safety
///
/// The `result` must have been returned by a docfill function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn docfill_free_result(result: DocfillResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Get the version of the docfill library.
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn docfill_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let version = docfill_version();
        assert!(!version.is_null());
    }

    #[test]
    fn test_null_template_path() {
        unsafe {
            let data = CString::new("{}").unwrap();
            let out = CString::new("out.docx").unwrap();
            let result = docfill_generate_file(
                ptr::null(),
                data.as_ptr(),
                out.as_ptr(),
                DocfillOptions::default(),
            );
            assert!(!result.success);
            assert!(!result.error.is_null());
            docfill_free_result(result);
        }
    }

    #[test]
    fn test_inspect_null() {
        unsafe {
            let result = docfill_inspect(ptr::null());
            assert!(!result.success);
            docfill_free_result(result);
        }
    }

    #[test]
    fn test_is_docx_null() {
        unsafe {
            assert!(!docfill_is_docx(ptr::null()));
        }
    }

    #[test]
    fn test_options_conversion() {
        let options = DocfillOptions {
            read_only: true,
            strict: true,
            headers_footers: false,
        };
        let converted: GenerateOptions = (&options).into();
        assert_eq!(converted.error_mode, ErrorMode::Strict);
        assert!(converted.read_only);
        assert!(!converted.headers_footers);
    }
}
