//! C conformance: the interop programs under `tests/interop` state the layout
//! contract in plain C. Each is compiled with the system C compiler, given the
//! layout Rust computed as `-D` defines, and run; a failed `assert` aborts it.

use fc_rt::{CLayout, FcSlice, TypeShape};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

#[derive(CLayout)]
#[repr(C)]
#[allow(dead_code)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(CLayout)]
#[repr(C)]
#[allow(dead_code)]
struct Mixed {
    a: u8,
    b: u64,
    c: u16,
    d: u32,
    e: u8,
}

#[derive(CLayout, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
enum Color {
    Red,
    Green,
    Blue,
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

fn interop_source(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/interop")
        .join(name)
}

fn struct_defines<T: CLayout>(prefix: &str) -> Vec<String> {
    let TypeShape::Struct {
        fields,
        size,
        align,
    } = T::SHAPE
    else {
        panic!("{} is not a struct", T::C_NAME);
    };
    let mut defines: Vec<String> = fields
        .iter()
        .map(|f| format!("-D{prefix}_{}={}", f.name.to_uppercase(), f.offset))
        .collect();
    defines.push(format!("-D{prefix}_SIZE={size}"));
    defines.push(format!("-D{prefix}_ALIGN={align}"));
    defines
}

/// Compile `source` with `defines`, run it, and fail the test on any error.
/// Skips with a message when no C compiler is installed.
fn compile_and_run(source: &str, defines: &[String]) {
    let Some(cc) = c_compiler() else {
        eprintln!("skipping {source}: no C compiler available");
        return;
    };

    let dir = tempdir().unwrap();
    let exe = dir.path().join("interop_test");
    let output = Command::new(&cc)
        .args(["-std=c11", "-Wall", "-Werror"])
        .args(defines)
        .arg(interop_source(source))
        .arg("-o")
        .arg(&exe)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{cc} failed for {source}: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output = Command::new(&exe).output().unwrap();
    assert!(
        output.status.success(),
        "{source} failed ({:?}): {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn struct_layout_matches_c() {
    let mut defines = struct_defines::<Point>("RUST_POINT");
    defines.extend(struct_defines::<Mixed>("RUST_MIXED"));
    compile_and_run("layout_test.c", &defines);
}

#[test]
fn enum_layout_matches_c() {
    let defines = [
        format!("-DRUST_COLOR_SIZE={}", Color::SHAPE.size()),
        format!("-DRUST_COLOR_GREEN={}", Color::Green.discriminant()),
    ];
    compile_and_run("enum_test.c", &defines);
}

#[test]
fn slice_layout_matches_c() {
    let defines = struct_defines::<FcSlice<i32>>("RUST_SLICE");
    compile_and_run("slice_test.c", &defines);
}

#[test]
fn rust_side_of_the_scenarios() {
    // The same facts the C programs assert, checked without a C compiler.
    let TypeShape::Struct { fields, size, .. } = Point::SHAPE else {
        unreachable!()
    };
    assert_eq!((fields[0].offset, fields[1].offset, size), (0, 4, 8));

    assert_eq!(Color::SHAPE.size(), 4);
    assert_eq!(Color::from_discriminant(1), Some(Color::Green));
    assert_eq!(Color::VARIANT_COUNT, 3);

    let slice = FcSlice::<i32>::SHAPE;
    assert_eq!(slice.size(), size_of::<*const i32>() + size_of::<usize>());
}
