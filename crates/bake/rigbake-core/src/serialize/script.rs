//! Setup script emitted next to the binary payload.
//!
//! Layout (multi export):
//! - header comments
//! - one `material.setAnimationFrames(unit, clip, start, end, 30);` per rest/main clip
//! - one multi-line `setAnimationFrames(..., 30, true)` per transition clip
//! - one `material.setAnimationTransitions(unit, source, { dst: "clip", ... });`
//!   per main clip that has outgoing transitions
//! - `const {unit}_animations = { numBones, totalFrames, ... };`

use std::io::Write;

use crate::descriptor::{ExportDescriptor, SingleClipDescriptor};
use crate::error::{ExportError, Result};

pub fn write_descriptor<W: Write>(desc: &ExportDescriptor, mut out: W) -> Result<()> {
    let unit = &desc.unit_name;
    let rate = desc.playback_rate;

    writeln!(out, "// Animation data for {unit}")?;
    writeln!(out, "// Helper functions to set up animations:")?;
    writeln!(out)?;
    writeln!(out, "// ==============================================")?;
    writeln!(out, "//   {} animations", title_case(unit))?;
    writeln!(out, "// ==============================================")?;
    writeln!(out)?;

    writeln!(out, "//Main animations")?;
    for clip in desc.playable() {
        writeln!(
            out,
            "material.setAnimationFrames({}, {}, {}, {}, {rate});",
            dq(unit),
            dq(&clip.name),
            clip.start_index,
            clip.end_index
        )?;
    }

    let mut transitions = desc.transitions().peekable();
    if transitions.peek().is_some() {
        writeln!(out)?;
        writeln!(out, "// Transition animations")?;
    }
    for clip in transitions {
        writeln!(out, "material.setAnimationFrames(")?;
        writeln!(out, "  {},", dq(unit))?;
        writeln!(out, "  {},", dq(&clip.name))?;
        writeln!(out, "  {},", clip.start_index)?;
        writeln!(out, "  {},", clip.end_index)?;
        writeln!(out, "  {rate},")?;
        writeln!(out, "  true")?;
        writeln!(out, ");")?;
    }
    writeln!(out)?;

    if !desc.adjacency.map.is_empty() {
        writeln!(out)?;
    }
    for source in desc.main_clips() {
        let Some(outgoing) = desc.adjacency.outgoing(&source.name) else {
            continue;
        };
        writeln!(
            out,
            "material.setAnimationTransitions({}, {}, {{",
            dq(unit),
            dq(&source.name)
        )?;
        let entries: Vec<String> = outgoing
            .iter()
            .map(|(dst, name)| format!("    {}: {}", object_key(dst), dq(name)))
            .collect();
        writeln!(out, "{}", entries.join(",\n"))?;
        writeln!(out, "}});")?;
    }
    writeln!(out)?;

    writeln!(out, "const {}_animations = {{", identifier(unit))?;
    writeln!(out, "  numBones: {},", desc.num_bones())?;
    writeln!(out, "  totalFrames: {},", desc.total_frames)?;
    writeln!(out, "  animationCount: {},", desc.animation_count())?;
    writeln!(out, "  frameCounts: [{}],", join(desc.frame_counts()))?;
    writeln!(out, "  frameSteps: [{}],", join(desc.frame_steps()))?;
    writeln!(out, "  animationRanges: [")?;
    for (start, end) in desc.animation_ranges() {
        writeln!(out, "    [{start}, {end}],")?;
    }
    writeln!(out, "  ],")?;
    writeln!(out, "  animationNames: [")?;
    for name in desc.animation_names() {
        writeln!(out, "    {},", sq(name))?;
    }
    writeln!(out, "  ],")?;
    writeln!(out, "  boneNames: [")?;
    for bone in &desc.bone_names {
        writeln!(out, "    {},", sq(bone))?;
    }
    writeln!(out, "  ],")?;
    writeln!(out, "}};")?;
    out.flush()?;
    Ok(())
}

pub fn write_single_descriptor<W: Write>(desc: &SingleClipDescriptor, mut out: W) -> Result<()> {
    writeln!(out, "// Animation data for {}", desc.name)?;
    writeln!(out, "const {}_animation = {{", identifier(&desc.name))?;
    writeln!(out, "  numBones: {},", desc.num_bones())?;
    writeln!(out, "  numFrames: {},", desc.num_frames)?;
    writeln!(out, "  startFrame: {},", desc.start_frame)?;
    writeln!(out, "  endFrame: {},", desc.end_frame)?;
    writeln!(out, "  frameStep: {},", desc.frame_step)?;
    writeln!(out, "  exportAllFrames: {},", desc.export_all_frames)?;
    writeln!(out, "  boneNames: [")?;
    for bone in &desc.bone_names {
        writeln!(out, "    {},", sq(bone))?;
    }
    writeln!(out, "  ],")?;
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "// Helper function to set up animation:")?;
    writeln!(
        out,
        "material.setAnimationFrames({}, 0, {}, {});",
        sq(&desc.name),
        desc.num_frames.saturating_sub(1),
        crate::descriptor::PLAYBACK_RATE
    )?;
    out.flush()?;
    Ok(())
}

pub fn render_descriptor(desc: &ExportDescriptor) -> Result<String> {
    let mut bytes = Vec::new();
    write_descriptor(desc, &mut bytes)?;
    into_string(bytes)
}

pub fn render_single_descriptor(desc: &SingleClipDescriptor) -> Result<String> {
    let mut bytes = Vec::new();
    write_single_descriptor(desc, &mut bytes)?;
    into_string(bytes)
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| ExportError::Serialization {
        reason: e.to_string(),
    })
}

fn join<T: ToString>(items: Vec<T>) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Double-quoted string literal.
fn dq(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// Single-quoted string literal.
fn sq(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Bare key when it is a valid identifier, quoted otherwise.
fn object_key(s: &str) -> String {
    if is_identifier(s) {
        s.to_string()
    } else {
        dq(s)
    }
}

/// Identifier-safe form of a free-text name.
fn identifier(s: &str) -> String {
    let mut out: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if !out.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$') {
        out.insert(0, '_');
    }
    out
}

/// Capitalise the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ClipKind, ClipRegistry};

    fn descriptor() -> ExportDescriptor {
        let mut reg = ClipRegistry::new();
        reg.push("heroRest", ClipKind::Rest, 1, 1, (1, 1));
        reg.push("Walk", ClipKind::Main, 3, 2, (1, 5));
        reg.push("Run", ClipKind::Main, 2, 1, (1, 2));
        reg.push("Walk_To_Run", ClipKind::Transition, 10, 1, (1, 10));
        reg.push("Run_To_Walk", ClipKind::Transition, 10, 1, (1, 10));
        let adjacency = reg.build_adjacency("hero");
        ExportDescriptor::new(
            "hero",
            vec!["root".into(), "spine".into()],
            reg.into_records(),
            adjacency,
        )
    }

    #[test]
    fn multi_script_lists_clips_transitions_and_layout() {
        let text = render_descriptor(&descriptor()).unwrap();
        assert!(text.starts_with("// Animation data for hero\n"));
        assert!(text.contains("//   Hero animations\n"));
        assert!(text.contains("material.setAnimationFrames(\"hero\", \"heroRest\", 0, 0, 30);\n"));
        assert!(text.contains("material.setAnimationFrames(\"hero\", \"Walk\", 1, 3, 30);\n"));
        assert!(text.contains("material.setAnimationFrames(\"hero\", \"Run\", 4, 5, 30);\n"));
        assert!(text.contains(
            "material.setAnimationFrames(\n  \"hero\",\n  \"Walk_To_Run\",\n  6,\n  15,\n  30,\n  true\n);\n"
        ));
        assert!(text.contains(
            "material.setAnimationTransitions(\"hero\", \"Walk\", {\n    Run: \"Walk_To_Run\"\n});\n"
        ));
        assert!(text.contains(
            "material.setAnimationTransitions(\"hero\", \"Run\", {\n    Walk: \"Run_To_Walk\"\n});\n"
        ));
        assert!(text.contains("const hero_animations = {\n  numBones: 2,\n  totalFrames: 26,\n  animationCount: 5,\n"));
        assert!(text.contains("  frameCounts: [1, 3, 2, 10, 10],\n"));
        assert!(text.contains("  frameSteps: [1, 2, 1, 1, 1],\n"));
        assert!(text.contains("  animationRanges: [\n    [1, 1],\n    [1, 5],\n"));
        assert!(text.contains("    'Walk_To_Run',\n"));
        assert!(text.contains("  boneNames: [\n    'root',\n    'spine',\n  ],\n};\n"));
    }

    #[test]
    fn no_transition_section_without_transitions() {
        let mut reg = ClipRegistry::new();
        reg.push("uRest", ClipKind::Rest, 1, 1, (1, 1));
        reg.push("Only", ClipKind::Main, 4, 1, (1, 4));
        let adjacency = reg.build_adjacency("u");
        let desc = ExportDescriptor::new("u", vec!["b".into()], reg.into_records(), adjacency);
        let text = render_descriptor(&desc).unwrap();
        assert!(!text.contains("// Transition animations"));
        assert!(!text.contains("setAnimationTransitions"));
    }

    #[test]
    fn single_script() {
        let desc = SingleClipDescriptor {
            name: "Walk".into(),
            bone_names: vec!["root".into()],
            num_frames: 3,
            start_frame: 1,
            end_frame: 5,
            frame_step: 2,
            export_all_frames: false,
        };
        let text = render_single_descriptor(&desc).unwrap();
        assert!(text.contains("const Walk_animation = {\n  numBones: 1,\n  numFrames: 3,\n"));
        assert!(text.contains("  exportAllFrames: false,\n"));
        assert!(text.ends_with("material.setAnimationFrames('Walk', 0, 2, 30);\n"));
    }

    #[test]
    fn names_are_escaped() {
        assert_eq!(sq("it's"), "'it\\'s'");
        assert_eq!(dq("a\"b"), "\"a\\\"b\"");
        assert_eq!(object_key("Run"), "Run");
        assert_eq!(object_key("Run Fast"), "\"Run Fast\"");
        assert_eq!(identifier("my unit"), "my_unit");
        assert_eq!(identifier("2b"), "_2b");
        assert_eq!(title_case("big_orc unit"), "Big_Orc Unit");
    }
}
