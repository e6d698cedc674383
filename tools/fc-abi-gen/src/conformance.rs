//! `fastc_layout_conformance.c`: a standalone C program that declares the
//! contract's reference types the way a C programmer would and asserts that
//! the C compiler lays them out exactly as `fc-layout` computed.

use crate::GenError;
use fc_layout::{EnumLayout, FieldLayout, Scalar, SliceLayout, StructLayout, TargetAbi};
use std::fmt::Write;

pub const FILE_NAME: &str = "fastc_layout_conformance.c";

const COLORS: [&str; 3] = ["Red", "Green", "Blue"];

/// `(name, scalar)` fields of the padding-heavy reference struct.
const MIXED: [(&str, Scalar); 5] = [
    ("a", Scalar::U8),
    ("b", Scalar::U64),
    ("c", Scalar::U16),
    ("d", Scalar::U32),
    ("e", Scalar::U8),
];

fn struct_layout(target: &TargetAbi, scalars: &[Scalar]) -> Result<StructLayout, GenError> {
    let fields: Vec<FieldLayout> = scalars
        .iter()
        .map(|&s| FieldLayout::scalar(s, target))
        .collect();
    Ok(StructLayout::compute(&fields)?)
}

pub fn render(target: &TargetAbi) -> Result<String, GenError> {
    let point = struct_layout(target, &[Scalar::I32, Scalar::I32])?;
    let mixed = struct_layout(target, &MIXED.map(|(_, s)| s))?;
    let color = EnumLayout::new(COLORS.len())?;
    let slice = SliceLayout::for_target(target)?;

    let mut c = String::new();
    let w = &mut c;

    writeln!(
        w,
        "/* FastC layout conformance for target {}. Generated by fc-abi-gen; do not edit. */",
        target.name
    )?;
    writeln!(w, "#include <assert.h>")?;
    writeln!(w, "#include <stdbool.h>")?;
    writeln!(w, "#include <stddef.h>")?;
    writeln!(w, "#include <stdint.h>")?;
    writeln!(w, "#include <stdio.h>")?;
    writeln!(w)?;
    writeln!(w, "typedef struct Point {{ int32_t x; int32_t y; }} Point;")?;
    write!(w, "typedef struct Mixed {{")?;
    for (name, scalar) in MIXED {
        write!(w, " {} {name};", scalar.c_name())?;
    }
    writeln!(w, " }} Mixed;")?;
    writeln!(w, "typedef enum Color {{ Color_{} }} Color;", COLORS.join(", Color_"))?;
    writeln!(w, "typedef struct {{ int32_t* data; size_t len; }} fc_slice_int32_t;")?;
    writeln!(w)?;
    writeln!(w, "int main(void) {{")?;

    writeln!(w, "    /* Scalar widths. */")?;
    for scalar in Scalar::ALL {
        writeln!(
            w,
            "    assert(sizeof({}) == {});",
            scalar.c_name(),
            scalar.size(target)
        )?;
    }

    writeln!(w)?;
    writeln!(w, "    /* Struct {{ int32_t x, y; }}. */")?;
    writeln!(w, "    assert(offsetof(Point, x) == {});", point.offsets()[0])?;
    writeln!(w, "    assert(offsetof(Point, y) == {});", point.offsets()[1])?;
    writeln!(w, "    assert(sizeof(Point) == {});", point.size())?;
    writeln!(w, "    Point p = {{ .x = 42, .y = 100 }};")?;
    writeln!(w, "    assert(p.x == 42 && p.y == 100);")?;

    writeln!(w)?;
    writeln!(w, "    /* Interior and tail padding. */")?;
    for ((name, _), offset) in MIXED.iter().zip(mixed.offsets()) {
        writeln!(w, "    assert(offsetof(Mixed, {name}) == {offset});")?;
    }
    writeln!(w, "    assert(sizeof(Mixed) == {});", mixed.size())?;

    writeln!(w)?;
    writeln!(w, "    /* Enum: a C int, variants numbered from zero. */")?;
    writeln!(w, "    assert(sizeof(Color) == {});", color.size())?;
    for (k, variant) in COLORS.iter().enumerate() {
        if let Some(value) = color.discriminant(k) {
            writeln!(w, "    assert(Color_{variant} == {value});")?;
        }
    }
    writeln!(w, "    Color c = Color_Green;")?;
    writeln!(w, "    assert(c == 1);")?;

    writeln!(w)?;
    writeln!(w, "    /* Slice {{ T* data; size_t len; }}. */")?;
    writeln!(
        w,
        "    assert(offsetof(fc_slice_int32_t, data) == {});",
        slice.data_offset
    )?;
    writeln!(
        w,
        "    assert(offsetof(fc_slice_int32_t, len) == {});",
        slice.len_offset
    )?;
    writeln!(w, "    assert(sizeof(fc_slice_int32_t) == {});", slice.size)?;
    writeln!(w, "    int32_t arr[] = {{ 1, 2, 3, 4, 5 }};")?;
    writeln!(w, "    fc_slice_int32_t s = {{ .data = arr, .len = 5 }};")?;
    writeln!(w, "    assert(s.len == 5 && s.data[0] == 1 && s.data[4] == 5);")?;

    writeln!(w)?;
    writeln!(w, "    puts(\"fastc layout conformance: ok\");")?;
    writeln!(w, "    return 0;")?;
    writeln!(w, "}}")?;
    Ok(c)
}
