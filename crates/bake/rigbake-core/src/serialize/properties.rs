//! Embedded-property form: the buffer and scalar layout fields stored as
//! key/value pairs on the armature object.
//!
//! Multi keys: `{name}`, `{name}_totalFrames`, `{name}_numBones`,
//! `{name}_animationCount`, `{name}_frameSteps`.
//! Single keys: `{name}`, `{name}_numFrames`, `{name}_numBones`.

use crate::descriptor::{ExportDescriptor, SingleClipDescriptor};
use crate::error::Result;
use crate::host::{PropertyStore, PropertyValue};
use crate::packing::MatrixBuffer;

/// `[1, 2, 1]`
pub fn format_step_list(steps: &[u32]) -> String {
    let items: Vec<String> = steps.iter().map(u32::to_string).collect();
    format!("[{}]", items.join(", "))
}

fn replace_matrices<P: PropertyStore + ?Sized>(
    store: &mut P,
    name: &str,
    buffer: &MatrixBuffer,
) -> Result<()> {
    store.remove_property(name)?;
    store.set_property(name, PropertyValue::FloatArray(buffer.as_slice().to_vec()))?;
    Ok(())
}

pub fn write_properties<P: PropertyStore + ?Sized>(
    desc: &ExportDescriptor,
    buffer: &MatrixBuffer,
    name: &str,
    store: &mut P,
) -> Result<()> {
    replace_matrices(store, name, buffer)?;
    store.set_property(
        &format!("{name}_totalFrames"),
        PropertyValue::Int(desc.total_frames as i64),
    )?;
    store.set_property(
        &format!("{name}_numBones"),
        PropertyValue::Int(desc.num_bones() as i64),
    )?;
    store.set_property(
        &format!("{name}_animationCount"),
        PropertyValue::Int(desc.animation_count() as i64),
    )?;
    store.set_property(
        &format!("{name}_frameSteps"),
        PropertyValue::Text(format_step_list(&desc.frame_steps())),
    )?;
    Ok(())
}

pub fn write_single_properties<P: PropertyStore + ?Sized>(
    desc: &SingleClipDescriptor,
    buffer: &MatrixBuffer,
    name: &str,
    store: &mut P,
) -> Result<()> {
    replace_matrices(store, name, buffer)?;
    store.set_property(
        &format!("{name}_numFrames"),
        PropertyValue::Int(desc.num_frames as i64),
    )?;
    store.set_property(
        &format!("{name}_numBones"),
        PropertyValue::Int(desc.num_bones() as i64),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_list_matches_list_literal() {
        assert_eq!(format_step_list(&[1, 2, 1]), "[1, 2, 1]");
        assert_eq!(format_step_list(&[]), "[]");
    }
}
