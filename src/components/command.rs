//! Building command tables.
//!
//! Every component type owns a [`CommandTable`] mapping verbs to handlers.
//! Family bases (wearable, ammunition, implant, powered machine) own their
//! own tables and leaf types overlay them, so an unrecognised verb on a leaf
//! falls through to the family table before the prototype reports it unknown.

use std::fmt;

use crate::components::catalog::{Catalog, CatalogEntry, CatalogKind};
use crate::components::input::StringStack;
use crate::components::types::{Difficulty, SizeCategory};
use crate::components::units::{UnitConverter, UnitKind};

/// Everything a building command may consult besides the prototype itself.
pub struct BuildContext<'a> {
    pub actor: &'a str,
    pub catalog: &'a dyn Catalog,
    pub units: &'a dyn UnitConverter,
}

impl<'a> BuildContext<'a> {
    pub fn new(actor: &'a str, catalog: &'a dyn Catalog, units: &'a dyn UnitConverter) -> Self {
        Self {
            actor,
            catalog,
            units,
        }
    }
}

/// What a building command did. Only `Changed` requires the prototype to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Changed(String),
    Unchanged(String),
    Rejected(String),
    Unknown(String),
}

impl CommandOutcome {
    pub fn message(&self) -> &str {
        match self {
            CommandOutcome::Changed(msg)
            | CommandOutcome::Unchanged(msg)
            | CommandOutcome::Rejected(msg)
            | CommandOutcome::Unknown(msg) => msg,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, CommandOutcome::Changed(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, CommandOutcome::Rejected(_) | CommandOutcome::Unknown(_))
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Handlers return `Err(prompt)` for malformed input; the prompt becomes a `Rejected` outcome.
pub type CommandResult = Result<CommandOutcome, String>;

pub type CommandHandler<T> = fn(&mut T, &BuildContext<'_>, &mut StringStack) -> CommandResult;

type ParentDispatch<T> =
    Box<dyn Fn(&mut T, &str, &BuildContext<'_>, &mut StringStack) -> Option<CommandOutcome> + Send + Sync>;

struct CommandEntry<T> {
    verbs: &'static [&'static str],
    help: &'static str,
    handler: CommandHandler<T>,
}

struct ParentTable<T> {
    dispatch: ParentDispatch<T>,
    help: Vec<(&'static [&'static str], &'static str)>,
}

pub struct CommandTable<T> {
    entries: Vec<CommandEntry<T>>,
    parents: Vec<ParentTable<T>>,
}

impl<T: 'static> Default for CommandTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> CommandTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// Register a handler under one or more verbs. The first verb is the one shown in help.
    pub fn verb(
        mut self,
        verbs: &'static [&'static str],
        help: &'static str,
        handler: CommandHandler<T>,
    ) -> Self {
        self.entries.push(CommandEntry {
            verbs,
            help,
            handler,
        });
        self
    }

    /// Fall back to `parent` (reached through `project`) for verbs this table does not define.
    pub fn overlay<P: 'static>(
        mut self,
        parent: &'static CommandTable<P>,
        project: fn(&mut T) -> &mut P,
    ) -> Self {
        self.parents.push(ParentTable {
            dispatch: Box::new(
                move |target: &mut T, verb: &str, ctx: &BuildContext<'_>, input: &mut StringStack| {
                    parent.dispatch(project(target), verb, ctx, input)
                },
            ),
            help: parent.help_entries(),
        });
        self
    }

    /// Run the handler for `verb`, or `None` when neither this table nor a parent knows it.
    pub fn dispatch(
        &self,
        target: &mut T,
        verb: &str,
        ctx: &BuildContext<'_>,
        input: &mut StringStack,
    ) -> Option<CommandOutcome> {
        let verb = verb.to_lowercase();
        if let Some(entry) = self
            .entries
            .iter()
            .find(|entry| entry.verbs.contains(&verb.as_str()))
        {
            return Some(match (entry.handler)(target, ctx, input) {
                Ok(outcome) => outcome,
                Err(prompt) => CommandOutcome::Rejected(prompt),
            });
        }
        self.parents
            .iter()
            .find_map(|parent| (parent.dispatch)(target, &verb, ctx, input))
    }

    pub fn knows(&self, verb: &str) -> bool {
        let verb = verb.to_lowercase();
        self.help_entries()
            .iter()
            .any(|(verbs, _)| verbs.contains(&verb.as_str()))
    }

    fn help_entries(&self) -> Vec<(&'static [&'static str], &'static str)> {
        let mut help: Vec<(&'static [&'static str], &'static str)> = self
            .entries
            .iter()
            .map(|entry| (entry.verbs, entry.help))
            .collect();
        for parent in &self.parents {
            for (verbs, text) in &parent.help {
                let shadowed = help
                    .iter()
                    .any(|(own, _)| own.iter().any(|verb| verbs.contains(verb)));
                if !shadowed {
                    help.push((*verbs, *text));
                }
            }
        }
        help
    }

    /// One line per verb: `verb - help`.
    pub fn help_lines(&self) -> Vec<String> {
        self.help_entries()
            .iter()
            .map(|(verbs, text)| format!("{} - {}", verbs[0], text))
            .collect()
    }
}

// ============================================================================
// Argument helpers shared by component handlers
// ============================================================================

pub fn parse_size(input: &mut StringStack, what: &str) -> Result<SizeCategory, String> {
    if input.is_finished() {
        return Err(format!(
            "What size should {} be? Valid sizes are: {}.",
            what,
            SizeCategory::options()
        ));
    }
    input.pop_remaining().parse()
}

pub fn parse_difficulty(input: &mut StringStack, what: &str) -> Result<Difficulty, String> {
    if input.is_finished() {
        return Err(format!(
            "What difficulty should {} be? Valid difficulties are: {}.",
            what,
            Difficulty::options()
        ));
    }
    input.pop_remaining().parse()
}

/// A whole number within `min..=max`.
pub fn parse_number(input: &mut StringStack, what: &str, min: u32, max: u32) -> Result<u32, String> {
    let prompt = || format!("You must enter a number between {} and {} for {}.", min, max, what);
    if input.is_finished() {
        return Err(prompt());
    }
    match input.pop().parse::<u32>() {
        Ok(value) if (min..=max).contains(&value) => Ok(value),
        _ => Err(prompt()),
    }
}

/// A non-negative amount in `kind` units, e.g. `500`, `2.5kW`, `3 lb`.
pub fn parse_amount(
    ctx: &BuildContext<'_>,
    input: &mut StringStack,
    kind: UnitKind,
    what: &str,
) -> Result<f64, String> {
    if input.is_finished() {
        return Err(format!("How much should {} be?", what));
    }
    let text = input.pop_remaining();
    match ctx.units.parse(&text, kind) {
        Some(value) if value >= 0.0 => Ok(value),
        Some(_) => Err(format!("{} cannot be negative.", capitalise(what))),
        None => Err(format!("'{}' is not a valid amount for {}.", text, what)),
    }
}

/// Resolve a catalog reference typed by the author.
pub fn parse_reference(
    ctx: &BuildContext<'_>,
    input: &mut StringStack,
    kind: CatalogKind,
) -> Result<CatalogEntry, String> {
    if input.is_finished() {
        return Err(format!("Which {} do you want to use?", kind));
    }
    let text = input.pop_remaining();
    ctx.catalog
        .lookup(kind, &text)
        .ok_or_else(|| format!("There is no {} identified by '{}'.", kind, text))
}

/// Like [`parse_reference`] but `none`/`clear` clears the reference.
pub fn parse_optional_reference(
    ctx: &BuildContext<'_>,
    input: &mut StringStack,
    kind: CatalogKind,
) -> Result<Option<CatalogEntry>, String> {
    if matches!(input.peek().to_lowercase().as_str(), "none" | "clear" | "remove") {
        input.pop();
        return Ok(None);
    }
    parse_reference(ctx, input, kind).map(Some)
}

/// Text for an emote or description: required, taken from the rest of the line.
pub fn parse_text(input: &mut StringStack, what: &str) -> Result<String, String> {
    if input.is_finished() {
        return Err(format!("What should {} be?", what));
    }
    Ok(input.pop_remaining())
}

pub fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::InMemoryCatalog;
    use crate::components::units::MetricUnits;
    use std::sync::OnceLock;

    #[derive(Default)]
    struct Family {
        bulky: bool,
    }

    #[derive(Default)]
    struct Leaf {
        count: u32,
        family: Family,
    }

    fn family_table() -> &'static CommandTable<Family> {
        static TABLE: OnceLock<CommandTable<Family>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::<Family>::new()
                .verb(&["bulky"], "toggle bulkiness", |family, _, _| {
                    family.bulky = !family.bulky;
                    Ok(CommandOutcome::Changed("bulky toggled".to_string()))
                })
                .verb(&["count"], "family count", |_, _, _| {
                    Ok(CommandOutcome::Unchanged("family".to_string()))
                })
        })
    }

    fn leaf_table() -> &'static CommandTable<Leaf> {
        static TABLE: OnceLock<CommandTable<Leaf>> = OnceLock::new();
        TABLE.get_or_init(|| {
            CommandTable::<Leaf>::new()
                .verb(&["count", "number"], "set the count", |leaf, _, input| {
                    leaf.count = parse_number(input, "the count", 1, 10)?;
                    Ok(CommandOutcome::Changed(format!("count {}", leaf.count)))
                })
                .overlay(family_table(), |leaf| &mut leaf.family)
        })
    }

    #[test]
    fn child_verbs_shadow_parent_verbs() {
        let catalog = InMemoryCatalog::new();
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        let mut leaf = Leaf::default();

        let outcome = leaf_table().dispatch(&mut leaf, "COUNT", &ctx, &mut StringStack::new("4"));
        assert_eq!(outcome, Some(CommandOutcome::Changed("count 4".to_string())));
        assert_eq!(leaf.count, 4);

        let outcome = leaf_table().dispatch(&mut leaf, "bulky", &ctx, &mut StringStack::new(""));
        assert!(outcome.unwrap().is_changed());
        assert!(leaf.family.bulky);

        assert!(leaf_table()
            .dispatch(&mut leaf, "frobnicate", &ctx, &mut StringStack::new(""))
            .is_none());
    }

    #[test]
    fn malformed_arguments_become_rejections() {
        let catalog = InMemoryCatalog::new();
        let ctx = BuildContext::new("tester", &catalog, &MetricUnits);
        let mut leaf = Leaf::default();
        let outcome = leaf_table()
            .dispatch(&mut leaf, "number", &ctx, &mut StringStack::new("99"))
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Rejected(_)));
        assert_eq!(leaf.count, 0);
    }

    #[test]
    fn help_lists_each_verb_once() {
        let lines = leaf_table().help_lines();
        assert_eq!(lines, vec!["count - set the count", "bulky - toggle bulkiness"]);
        assert!(leaf_table().knows("number"));
        assert!(leaf_table().knows("bulky"));
    }
}
