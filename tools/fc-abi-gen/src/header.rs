//! `fastc_runtime.h`: declarations for every symbol `fc-rt` exports, plus the
//! types those symbols exchange.

use crate::GenError;
use fc_alloc::FcAllocator;
use fc_layout::{CLayout, SLICE_ELEMENTS, TypeShape, slice_c_name};
use fc_trap::FaultKind;
use std::fmt::Write;

pub const FILE_NAME: &str = "fastc_runtime.h";

/// C declarator of each `FcAllocator` field, by Rust field name.
fn allocator_field(name: &str) -> Option<&'static str> {
    match name {
        "ctx" => Some("void* ctx"),
        "alloc" => Some("void* (*alloc)(void* ctx, size_t size, size_t align)"),
        "free" => Some("void (*free)(void* ctx, void* ptr)"),
        _ => None,
    }
}

pub fn render() -> Result<String, GenError> {
    let mut h = String::new();
    let w = &mut h;

    writeln!(w, "/* FastC runtime interface. Generated by fc-abi-gen; do not edit. */")?;
    writeln!(w, "#ifndef FASTC_RUNTIME_H")?;
    writeln!(w, "#define FASTC_RUNTIME_H")?;
    writeln!(w)?;
    writeln!(w, "#include <stdbool.h>")?;
    writeln!(w, "#include <stddef.h>")?;
    writeln!(w, "#include <stdint.h>")?;
    writeln!(w)?;
    writeln!(w, "#ifdef __cplusplus")?;
    writeln!(w, "#define FC_NORETURN [[noreturn]]")?;
    writeln!(w, "extern \"C\" {{")?;
    writeln!(w, "#else")?;
    writeln!(w, "#define FC_NORETURN _Noreturn")?;
    writeln!(w, "#endif")?;
    writeln!(w)?;

    fault_section(w)?;
    unaligned_section(w)?;
    allocator_section(w)?;

    writeln!(w, "/* Returns 0, or -1 on a bad environment value, or 1 if a logger was already installed. */")?;
    writeln!(w, "int fc_rt_init(void);")?;
    writeln!(w)?;

    slice_section(w)?;

    writeln!(w, "#ifdef __cplusplus")?;
    writeln!(w, "}}")?;
    writeln!(w, "#endif")?;
    writeln!(w)?;
    writeln!(w, "#endif /* FASTC_RUNTIME_H */")?;
    Ok(h)
}

fn fault_section(w: &mut String) -> Result<(), GenError> {
    writeln!(w, "/* Faults: report and abort; never return. */")?;
    writeln!(w, "typedef enum {} {{", FaultKind::C_NAME)?;
    for kind in FaultKind::ALL {
        writeln!(w, "    {} = {},", kind.c_constant(), kind.discriminant())?;
    }
    writeln!(w, "}} {};", FaultKind::C_NAME)?;
    writeln!(w)?;
    writeln!(w, "FC_NORETURN void fc_trap(void);")?;
    writeln!(w, "FC_NORETURN void fc_trap_kind(int kind);")?;
    writeln!(w)?;
    Ok(())
}

fn unaligned_section(w: &mut String) -> Result<(), GenError> {
    writeln!(w, "/* Unaligned access: byte copies, host byte order, no bounds checks. */")?;
    for bits in [16, 32, 64] {
        writeln!(w, "uint{bits}_t fc_read_u{bits}_unaligned(const void* ptr);")?;
    }
    for bits in [16, 32, 64] {
        writeln!(w, "void fc_write_u{bits}_unaligned(void* ptr, uint{bits}_t value);")?;
    }
    writeln!(w, "void fc_memcpy(void* dst, const void* src, size_t n);")?;
    writeln!(w)?;
    Ok(())
}

fn allocator_section(w: &mut String) -> Result<(), GenError> {
    let name = FcAllocator::C_NAME;
    let TypeShape::Struct { fields, .. } = FcAllocator::SHAPE else {
        return Err(GenError::NotAStruct(name));
    };

    writeln!(w, "/* Allocation: NULL on failure; never faults. */")?;
    writeln!(w, "void* fc_alloc(size_t size, size_t align);")?;
    writeln!(w, "void fc_free(void* ptr);")?;
    writeln!(w)?;
    writeln!(w, "typedef struct {name} {{")?;
    for field in fields {
        let decl = allocator_field(field.name).ok_or(GenError::UnknownField {
            ty: name,
            field: field.name,
        })?;
        writeln!(w, "    {decl};")?;
    }
    writeln!(w, "}} {name};")?;
    writeln!(w)?;
    writeln!(w, "{name} fc_allocator_system(void);")?;
    writeln!(w, "void* fc_allocator_alloc(const {name}* allocator, size_t size, size_t align);")?;
    writeln!(w, "void fc_allocator_free(const {name}* allocator, void* ptr);")?;
    writeln!(w)?;
    Ok(())
}

fn slice_section(w: &mut String) -> Result<(), GenError> {
    writeln!(w, "/* Slices: non-owning {{ T* data; size_t len; }} views. */")?;
    writeln!(w, "#define FC_DEFINE_SLICE(T, name) \\")?;
    writeln!(w, "    typedef struct {{ T* data; size_t len; }} name")?;
    writeln!(w)?;
    for &elem in SLICE_ELEMENTS {
        if let Some(name) = slice_c_name(elem) {
            writeln!(w, "FC_DEFINE_SLICE({}, {name});", elem.c_name())?;
        }
    }
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_every_export() {
        let h = render().unwrap();
        for symbol in [
            "fc_trap(void)",
            "fc_trap_kind(int kind)",
            "fc_read_u16_unaligned",
            "fc_read_u32_unaligned",
            "fc_read_u64_unaligned",
            "fc_write_u16_unaligned",
            "fc_write_u32_unaligned",
            "fc_write_u64_unaligned",
            "fc_memcpy",
            "fc_alloc(size_t size, size_t align)",
            "fc_free(void* ptr)",
            "fc_allocator_system(void)",
            "fc_allocator_alloc",
            "fc_allocator_free",
            "fc_rt_init(void)",
        ] {
            assert!(h.contains(symbol), "missing {symbol}");
        }
    }

    #[test]
    fn traps_are_noreturn() {
        let h = render().unwrap();
        assert!(h.contains("FC_NORETURN void fc_trap(void);"));
        assert!(h.contains("#define FC_NORETURN _Noreturn"));
    }

    #[test]
    fn fault_kinds_are_numbered_in_order() {
        let h = render().unwrap();
        assert!(h.contains("    FC_FAULT_UNSPECIFIED = 0,\n    FC_FAULT_BOUNDS_CHECK = 1,"));
        assert!(h.contains("} fc_fault_kind;"));
    }

    #[test]
    fn allocator_fields_follow_rust_order() {
        let h = render().unwrap();
        let ctx = h.find("    void* ctx;").unwrap();
        let alloc = h.find("(*alloc)").unwrap();
        let free = h.find("(*free)").unwrap();
        assert!(ctx < alloc && alloc < free);
    }

    #[test]
    fn slice_typedefs() {
        let h = render().unwrap();
        assert!(h.contains("FC_DEFINE_SLICE(int32_t, fc_slice_int32_t);"));
        assert!(h.contains("FC_DEFINE_SLICE(double, fc_slice_double);"));
        assert_eq!(h.matches("FC_DEFINE_SLICE(").count(), SLICE_ELEMENTS.len() + 1);
    }

    #[test]
    fn guarded_once() {
        let h = render().unwrap();
        assert!(h.starts_with("/* FastC runtime interface."));
        assert!(h.trim_end().ends_with("#endif /* FASTC_RUNTIME_H */"));
    }
}
