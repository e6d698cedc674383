//! Death tests: each test re-runs this test binary, filtered to itself, with
//! an environment marker set. The child executes the faulting body; the parent
//! checks how the child died.

use fc_trap::check::{self, Trapping};
use fc_trap::{FaultKind, fault, set_quiet, trap};
use std::process::{Command, Output};

const CHILD_ENV: &str = "FC_TRAP_DEATH_TEST";

fn run_child(test: &str) -> Output {
    Command::new(std::env::current_exe().unwrap())
        .args([test, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, test)
        .output()
        .unwrap()
}

fn assert_aborted(out: &Output, expected: &str) {
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(!out.status.success(), "child exited cleanly: {stderr}");
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(out.status.signal(), Some(6), "expected SIGABRT: {stderr}");
    }
    assert!(
        stderr.contains(expected),
        "missing {expected:?} in child stderr: {stderr}"
    );
    assert!(!stderr.contains("panicked"), "fault unwound: {stderr}");
}

macro_rules! death_test {
    ($name:ident, $expected:expr, $body:block) => {
        #[test]
        fn $name() {
            if std::env::var(CHILD_ENV).as_deref() == Ok(stringify!($name)) {
                let body = || $body;
                body();
                unreachable!("fault returned");
            }
            let out = run_child(stringify!($name));
            assert_aborted(&out, $expected);
        }
    };
}

death_test!(bare_trap_aborts, "fastc: fatal runtime fault: trap at", {
    trap();
});

death_test!(fault_names_kind_and_caller, "out of memory at ", {
    fault(FaultKind::OutOfMemory);
});

death_test!(index_equal_to_length_faults, "index out of bounds", {
    let xs = [1, 2, 3];
    check::bounds(xs.len(), xs.len());
});

death_test!(null_pointer_faults, "null pointer dereference", {
    let _ = check::non_null(std::ptr::null::<u32>());
});

death_test!(signed_add_overflow_faults, "arithmetic overflow", {
    let _ = i32::MAX.trapping_add(std::hint::black_box(1));
});

death_test!(unsigned_sub_underflow_faults, "arithmetic overflow", {
    let _ = 0u64.trapping_sub(std::hint::black_box(1));
});

death_test!(min_div_minus_one_faults, "arithmetic overflow", {
    let _ = i64::MIN.trapping_div(std::hint::black_box(-1));
});

death_test!(division_by_zero_faults, "division by zero", {
    let _ = 10u32.trapping_rem(std::hint::black_box(0));
});

death_test!(missing_value_faults_with_given_kind, "invalid value", {
    let _: u8 = check::unwrap_or_fault(None, FaultKind::InvalidValue);
});

death_test!(quiet_fault_still_aborts, "", {
    set_quiet(true);
    trap();
});

#[test]
fn quiet_fault_writes_no_diagnostic() {
    if std::env::var(CHILD_ENV).is_ok() {
        return;
    }
    let out = run_child("quiet_fault_still_aborts");
    assert!(!String::from_utf8_lossy(&out.stderr).contains("fatal runtime fault"));
}

#[test]
fn location_points_at_the_check_site() {
    // `#[track_caller]` carries the location through the check helpers.
    if std::env::var(CHILD_ENV).is_ok() {
        return;
    }
    let out = run_child("index_equal_to_length_faults");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("tests/fault.rs:"), "{stderr}");
}
