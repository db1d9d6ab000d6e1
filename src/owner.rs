//! User and group name lookup
//!
//! Wraps the reentrant `getpwuid_r`/`getgrgid_r` calls. An id without a
//! directory entry resolves to `None`; callers decide the fallback.

use std::ffi::CStr;
use std::ptr;

const INITIAL_BUFFER: usize = 1024;
const MAX_BUFFER: usize = 1 << 20;

/// Name of the user owning `uid`, if the user database knows it
pub fn user_name(uid: u32) -> Option<String> {
    let mut buf = vec![0 as libc::c_char; INITIAL_BUFFER];
    loop {
        // SAFETY: passwd is plain old data; getpwuid_r fills it and points
        // its strings into `buf`, which outlives every read below.
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = ptr::null_mut();
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
            return None;
        }
        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

/// Name of the group `gid`, if the group database knows it
pub fn group_name(gid: u32) -> Option<String> {
    let mut buf = vec![0 as libc::c_char; INITIAL_BUFFER];
    loop {
        // SAFETY: as in `user_name`, with the group record.
        let mut grp: libc::group = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::group = ptr::null_mut();
        let rc = unsafe {
            libc::getgrgid_r(gid, &mut grp, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() || grp.gr_name.is_null() {
            return None;
        }
        let name = unsafe { CStr::from_ptr(grp.gr_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}
