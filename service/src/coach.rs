//! Coach / Explainer (spec §4.H): a tree-printer over a `Model`'s fields
//! using UTF-8 box glyphs, plus `explain(path)`, which walks a model down to
//! the type addressed by a path and renders that type's own attribute dump.
//!
//! Branch state is a packed 64-bit word, 2 bits/level (`None=0, Straight=1,
//! Corner=2, Tee=3`), giving up to 32 nesting levels before the stack would
//! need to widen. Pushing a new segment first "closes out" the parent's own
//! frame — `Corner` collapses to `None`, `Tee` to `Straight` — since once a
//! child is being rendered under it, the parent's connector has already
//! been drawn and only its continuation (or lack of one) still matters to
//! every line below.

use ace_core::model::Model;
use ace_core::path::Item;
use ace_core::types::ModelResolver;
use ace_core::Path;

const MAX_DEPTH: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    None = 0,
    Straight = 1,
    Corner = 2,
    Tee = 3,
}

impl Branch {
    fn from_bits(bits: u64) -> Branch {
        match bits & 0b11 {
            0 => Branch::None,
            1 => Branch::Straight,
            2 => Branch::Corner,
            _ => Branch::Tee,
        }
    }

    fn indent(self) -> &'static str {
        match self {
            Branch::None => "    ",
            Branch::Straight => "\u{2502}   ",
            Branch::Corner => "\u{2514}\u{2500}\u{2500} ",
            Branch::Tee => "\u{251c}\u{2500}\u{2500} ",
        }
    }
}

/// Packed branch-state stack described in spec §4.H.
#[derive(Debug, Clone, Copy, Default)]
struct BranchStack {
    word: u64,
    depth: u32,
}

impl BranchStack {
    fn push(&mut self, state: Branch) {
        if self.depth > 0 {
            let shift = 2 * (self.depth - 1);
            let top = Branch::from_bits(self.word >> shift);
            let collapsed = match top {
                Branch::Corner => Branch::None,
                Branch::Tee => Branch::Straight,
                other => other,
            };
            self.word &= !(0b11 << shift);
            self.word |= (collapsed as u64) << shift;
        }
        debug_assert!(self.depth < MAX_DEPTH, "Coach tree nests past 32 levels");
        let shift = 2 * self.depth;
        self.word |= (state as u64) << shift;
        self.depth += 1;
    }

    fn pop(&mut self) {
        self.depth -= 1;
        let shift = 2 * self.depth;
        self.word &= !(0b11 << shift);
    }

    fn prefix(&self) -> String {
        let mut out = String::new();
        for i in 0..self.depth {
            out.push_str(Branch::from_bits(self.word >> (2 * i)).indent());
        }
        out
    }
}

/// Renders a `Model`'s field tree, and addresses a single field's attribute
/// dump by path, recursing through `Class`/`Selector` fields via `resolver`.
pub struct Coach<'a> {
    resolver: &'a dyn ModelResolver,
}

impl<'a> Coach<'a> {
    /// Build a Coach that follows `Class`/`Selector` references through
    /// `resolver` (typically an `Environment`).
    pub fn new(resolver: &'a dyn ModelResolver) -> Self {
        Self { resolver }
    }

    /// Render `model`'s body as a box-drawn tree, one line per field,
    /// recursing one level into any `Class`/`Selector` whose target model
    /// `resolver` can resolve.
    pub fn render(&self, model: &Model) -> String {
        let mut out = String::new();
        out.push_str(&model.name);
        out.push('\n');
        let mut stack = BranchStack::default();
        self.render_body(model, &mut stack, &mut out);
        out
    }

    fn render_body(&self, model: &Model, stack: &mut BranchStack, out: &mut String) {
        let n = model.body.len();
        for (i, (_, ty)) in model.body.iter().enumerate() {
            let is_last = i + 1 == n;
            stack.push(if is_last { Branch::Corner } else { Branch::Tee });
            out.push_str(&stack.prefix());
            out.push_str(&ty.explain());
            out.push('\n');

            let mut includes = Vec::new();
            ty.collect_includes(&mut includes);
            for name in &includes {
                if let Some(sub) = self.resolver.resolve(name) {
                    self.render_body(sub, stack, out);
                }
            }
            stack.pop();
        }
    }

    /// Walk `model` along `path`'s named steps to the field it addresses,
    /// descending into a `Class`/`Selector`'s referenced model for any
    /// further steps, and return that field's own attribute dump (spec
    /// §4.H: "`explain(path)`... prints its full attribute dump at that
    /// point"). `None` if `path` doesn't address a field.
    pub fn explain(&self, model: &Model, path: &Path) -> Option<String> {
        let mut current = model;
        let mut last = None;
        for item in path.items() {
            let name = match item {
                Item::Named(n) => n.as_str(),
                Item::Global | Item::Local => continue,
                Item::Indexed(_) | Item::Any => return last.map(|t| t.explain()),
            };
            let ty = current.body.get(name)?;
            last = Some(ty.as_ref());

            let mut includes = Vec::new();
            ty.collect_includes(&mut includes);
            if let Some(next_name) = includes.first() {
                if let Some(next_model) = self.resolver.resolve(next_name) {
                    current = next_model;
                }
            }
        }
        last.map(|t| t.explain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ace_core::types::NoModels;
    use serde_json::json;

    fn model_from_json(j: serde_json::Value) -> Model {
        let v = ace_core::adapter::from_serde_json(&j);
        Model::from_value("test", &v).unwrap()
    }

    #[test]
    fn render_draws_corner_for_last_field() {
        let model = model_from_json(json!({
            "body": {
                "a": {"type": "boolean", "arity": "1"},
                "b": {"type": "string", "arity": "1"},
            }
        }));
        let coach = Coach::new(&NoModels);
        let tree = coach.render(&model);
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("\u{251c}\u{2500}\u{2500} "));
        assert!(lines[2].starts_with("\u{2514}\u{2500}\u{2500} "));
    }

    #[test]
    fn explain_finds_field_attribute_dump() {
        let model = model_from_json(json!({
            "body": { "port": {"type": "integer", "range": "[0..65535]", "arity": "1"} }
        }));
        let coach = Coach::new(&NoModels);
        let dump = coach.explain(&model, &Path::parse("$.port").unwrap()).unwrap();
        assert!(dump.contains("port"));
        assert!(dump.contains("range"));
    }

    #[test]
    fn explain_returns_none_for_unknown_field() {
        let model = model_from_json(json!({ "body": {} }));
        let coach = Coach::new(&NoModels);
        assert!(coach.explain(&model, &Path::parse("$.missing").unwrap()).is_none());
    }
}
