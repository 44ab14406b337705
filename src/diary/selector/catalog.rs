use crate::diary::types::{EntryMode, PromptTemplate, Register};

/// Built-in prompt catalog. Every mode carries at least one template per
/// register so a register preference never empties a mode.
pub static CATALOG: &[PromptTemplate] = &[
    // directive
    PromptTemplate {
        id: "directive.next_move",
        register: Register::Active,
        mode: EntryMode::Directive,
        template: "Decide what deserves attention next and say plainly why it comes first.",
        title_hint: "Next move",
    },
    PromptTemplate {
        id: "directive.clear_the_backlog",
        register: Register::Passive,
        mode: EntryMode::Directive,
        template: "Some work has slipped past its due date. Name what is overdue, what is blocking it, and the smallest step that gets it moving again.",
        title_hint: "Clearing the backlog",
    },
    PromptTemplate {
        id: "directive.triage",
        register: Register::Passive,
        mode: EntryMode::Directive,
        template: "Things are piling up. Triage them: what must happen today, what can wait, what can be dropped.",
        title_hint: "Triage",
    },
    // exploratory
    PromptTemplate {
        id: "exploratory.momentum",
        register: Register::Active,
        mode: EntryMode::Exploratory,
        template: "Several things went well recently. Look for the pattern behind that momentum and one idea worth trying next.",
        title_hint: "Riding the momentum",
    },
    PromptTemplate {
        id: "exploratory.what_if",
        register: Register::Active,
        mode: EntryMode::Exploratory,
        template: "Pick one recent success and ask what would change if it became a habit.",
        title_hint: "What if",
    },
    PromptTemplate {
        id: "exploratory.curiosity",
        register: Register::Passive,
        mode: EntryMode::Exploratory,
        template: "Something in the recent work raised a question you have not answered yet. Write it down and follow it a little way.",
        title_hint: "An open question",
    },
    // reflective
    PromptTemplate {
        id: "reflective.friction",
        register: Register::Passive,
        mode: EntryMode::Reflective,
        template: "Something has been getting in the way. Describe the friction honestly and what it taught you.",
        title_hint: "Working through friction",
    },
    PromptTemplate {
        id: "reflective.tool_trouble",
        register: Register::Passive,
        mode: EntryMode::Reflective,
        template: "Some tools misbehaved recently. Reflect on how that shaped the day and what to do differently.",
        title_hint: "When the tools push back",
    },
    PromptTemplate {
        id: "reflective.stock_take",
        register: Register::Active,
        mode: EntryMode::Reflective,
        template: "Take stock of where things stand: what moved, what stalled, and how that feels.",
        title_hint: "Taking stock",
    },
    // casual
    PromptTemplate {
        id: "casual.check_in",
        register: Register::Active,
        mode: EntryMode::Casual,
        template: "Write a relaxed check-in about the day so far, the way you would tell a friend.",
        title_hint: "Quick check-in",
    },
    PromptTemplate {
        id: "casual.small_wins",
        register: Register::Active,
        mode: EntryMode::Casual,
        template: "Note a couple of small things that went smoothly and what is coming up.",
        title_hint: "Small wins",
    },
    PromptTemplate {
        id: "casual.quiet_stretch",
        register: Register::Passive,
        mode: EntryMode::Casual,
        template: "It has been a quiet stretch. Write a few easy lines about what is on your mind.",
        title_hint: "A quiet stretch",
    },
];

pub fn templates_for(mode: EntryMode) -> impl Iterator<Item = &'static PromptTemplate> {
    CATALOG.iter().filter(move |template| template.mode == mode)
}

#[cfg(test)]
pub fn find(id: &str) -> Option<&'static PromptTemplate> {
    CATALOG.iter().find(|template| template.id == id)
}
