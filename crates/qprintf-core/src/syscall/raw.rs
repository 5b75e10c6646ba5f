//! Raw Linux syscall instructions.
//!
//! ```text
//!            x86_64     aarch64
//! number     rax        x8
//! arg1..3    rdi rsi rdx  x0 x1 x2
//! return     rax        x0
//! clobbered  rcx r11    (none)
//! ```
//!
//! The raw return is passed back untouched; `[-4095, -1]` encodes `-errno`.

use core::arch::asm;

/// Issue a syscall with 3 arguments.
///
/// # Safety
///
/// The caller must supply a valid syscall number and arguments that satisfy
/// that syscall's contract (pointer validity in particular).
#[cfg(target_arch = "x86_64")]
#[inline]
pub unsafe fn syscall3(nr: usize, a1: usize, a2: usize, a3: usize) -> usize {
    let ret: usize;
    // SAFETY: Inline asm issues syscall instruction. Caller guarantees validity.
    unsafe {
        asm!(
            "syscall",
            inlateout("rax") nr => ret,
            in("rdi") a1,
            in("rsi") a2,
            in("rdx") a3,
            lateout("rcx") _,
            lateout("r11") _,
            options(nostack, preserves_flags),
        );
    }
    ret
}

/// Issue a syscall with 3 arguments.
///
/// # Safety
///
/// The caller must supply a valid syscall number and arguments that satisfy
/// that syscall's contract (pointer validity in particular).
#[cfg(target_arch = "aarch64")]
#[inline]
pub unsafe fn syscall3(nr: usize, a1: usize, a2: usize, a3: usize) -> usize {
    let ret: usize;
    // SAFETY: Inline asm issues svc #0. Caller guarantees validity.
    unsafe {
        asm!(
            "svc 0",
            in("x8") nr,
            inlateout("x0") a1 => ret,
            in("x1") a2,
            in("x2") a3,
            options(nostack, preserves_flags),
        );
    }
    ret
}
