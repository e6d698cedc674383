//! Runs the generator binary and hands its output to the system C compiler.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn generate(out_dir: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fc-abi-gen"))
        .arg(out_dir)
        .args(extra)
        .output()
        .unwrap()
}

fn c_compiler() -> Option<String> {
    let cc = std::env::var("CC").unwrap_or_else(|_| "cc".to_string());
    Command::new(&cc)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|_| cc)
}

fn assert_ok(what: &str, out: &Output) {
    assert!(
        out.status.success(),
        "{what} failed ({:?}): {}",
        out.status,
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn writes_both_files() {
    let dir = tempdir().unwrap();
    let out = generate(dir.path(), &[]);
    assert_ok("fc-abi-gen", &out);

    let header = std::fs::read_to_string(dir.path().join("fastc_runtime.h")).unwrap();
    assert!(header.contains("#ifndef FASTC_RUNTIME_H"));
    let program = std::fs::read_to_string(dir.path().join("fastc_layout_conformance.c")).unwrap();
    assert!(program.contains("for target host"));
}

#[test]
fn rejects_bad_arguments() {
    let dir = tempdir().unwrap();

    let out = generate(dir.path(), &["--target", "pdp11"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown target `pdp11`"));

    let out = Command::new(env!("CARGO_BIN_EXE_fc-abi-gen"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("usage: fc-abi-gen"));
}

#[test]
fn preset_target_is_recorded() {
    let dir = tempdir().unwrap();
    assert_ok("fc-abi-gen", &generate(dir.path(), &["--target", "i686-sysv"]));
    let program = std::fs::read_to_string(dir.path().join("fastc_layout_conformance.c")).unwrap();
    assert!(program.contains("assert(sizeof(fc_slice_int32_t) == 8);"));
}

#[test]
fn host_conformance_program_passes() {
    let Some(cc) = c_compiler() else {
        eprintln!("skipping: no C compiler available");
        return;
    };
    let dir = tempdir().unwrap();
    assert_ok("fc-abi-gen", &generate(dir.path(), &[]));

    let exe = dir.path().join("conformance");
    let out = Command::new(&cc)
        .args(["-std=c11", "-Wall", "-Werror"])
        .arg(dir.path().join("fastc_layout_conformance.c"))
        .arg("-o")
        .arg(&exe)
        .output()
        .unwrap();
    assert_ok(&cc, &out);

    let out = Command::new(&exe).output().unwrap();
    assert_ok("conformance program", &out);
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "fastc layout conformance: ok\n"
    );
}

#[test]
fn header_compiles_as_c() {
    let Some(cc) = c_compiler() else {
        eprintln!("skipping: no C compiler available");
        return;
    };
    let dir = tempdir().unwrap();
    assert_ok("fc-abi-gen", &generate(dir.path(), &[]));

    let user = dir.path().join("user.c");
    std::fs::write(
        &user,
        "#include \"fastc_runtime.h\"\n\
         int sum(fc_slice_int32_t s) {\n\
         \x20   int total = 0;\n\
         \x20   for (size_t k = 0; k < s.len; k++) total += s.data[k];\n\
         \x20   return total;\n\
         }\n\
         void *grab(void) {\n\
         \x20   FcAllocator a = fc_allocator_system();\n\
         \x20   return fc_allocator_alloc(&a, 16, 8);\n\
         }\n\
         void die(void) { fc_trap_kind(FC_FAULT_UNREACHABLE); }\n",
    )
    .unwrap();

    let out = Command::new(&cc)
        .args(["-std=c11", "-Wall", "-Werror", "-fsyntax-only", "-I"])
        .arg(dir.path())
        .arg(&user)
        .output()
        .unwrap();
    assert_ok(&cc, &out);
}
