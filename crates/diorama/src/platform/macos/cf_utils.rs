/*! Core Foundation helpers for reading `CGWindowList` dictionaries. */

#![allow(unsafe_code)]

use objc2_core_foundation::{CFDictionary, CFNumber, CFNumberType, CFRetained, CFString, CGRect};
use objc2_core_graphics::CGRectMakeWithDictionaryRepresentation;
use std::ffi::c_void;

fn get_cf_dictionary_value<T>(dict: &CFDictionary, key: &str) -> Option<*const T> {
  let key = CFString::from_str(key);
  let key_ref = key.as_ref() as *const CFString;
  if unsafe { CFDictionary::contains_ptr_key(dict, key_ref.cast()) } {
    let value = unsafe { CFDictionary::value(dict, key_ref.cast()) };
    (!value.is_null()).then(|| value.cast::<T>())
  } else {
    None
  }
}

/// Read a number as `i64`. `None` when the key is missing or not convertible.
pub(super) fn get_cf_i64(dict: &CFDictionary, key: &str) -> Option<i64> {
  let number = get_cf_dictionary_value::<CFNumber>(dict, key)?;
  let mut value: i64 = 0;
  let ok = unsafe {
    CFNumber::value(
      &*number,
      CFNumberType::SInt64Type,
      (&raw mut value).cast::<c_void>(),
    )
  };
  ok.then_some(value)
}

/// Read a number as `f64`.
pub(super) fn get_cf_f64(dict: &CFDictionary, key: &str) -> Option<f64> {
  let number = get_cf_dictionary_value::<CFNumber>(dict, key)?;
  let mut value: f64 = 0.0;
  let ok = unsafe {
    CFNumber::value(
      &*number,
      CFNumberType::Float64Type,
      (&raw mut value).cast::<c_void>(),
    )
  };
  ok.then_some(value)
}

pub(super) fn get_cf_string(dict: &CFDictionary, key: &str) -> Option<String> {
  get_cf_dictionary_value::<CFString>(dict, key).map(|value| unsafe { (*value).to_string() })
}

/// Parse `kCGWindowBounds`.
pub(super) fn get_cf_window_bounds(dict: &CFDictionary) -> Option<CGRect> {
  let dict_rect = get_cf_dictionary_value::<CFDictionary>(dict, "kCGWindowBounds")?;
  let mut cg_rect = CGRect::default();
  let ok = unsafe { CGRectMakeWithDictionaryRepresentation(Some(&*dict_rect), &raw mut cg_rect) };
  ok.then_some(cg_rect)
}

pub(super) fn retain_cf_dictionary(ptr: *const CFDictionary) -> Option<CFRetained<CFDictionary>> {
  if ptr.is_null() {
    None
  } else {
    Some(unsafe { CFRetained::retain(std::ptr::NonNull::from(&*ptr)) })
  }
}
