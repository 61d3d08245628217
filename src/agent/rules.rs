//! The ordered rule table for reply selection
//!
//! A fixed, first-match list of substring predicates over the lower-cased
//! utterance. Rule order is load-bearing ("hello, what time is it" greets)
//! and is pinned by tests. Handlers may decline, in which case matching
//! continues down the table; an utterance nothing claims gets the fallback
//! echo.

use super::math;
use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// The fixed joke list, picked from uniformly
pub const JOKES: [&str; 4] = [
    "Why don't scientists trust atoms? Because they make up everything!",
    "Why did the scarecrow win an award? He was outstanding in his field!",
    "What do you call a bear with no teeth? A gummy bear!",
    "Why don't eggs tell jokes? They'd crack each other up!",
];

/// Ambient inputs for the rule handlers, injectable for deterministic tests
pub struct RuleContext {
    clock: Box<dyn Fn() -> DateTime<Local> + Send>,
    rng: StdRng,
}

impl RuleContext {
    /// Wall clock and entropy-seeded RNG
    pub fn new() -> Self {
        Self {
            clock: Box::new(Local::now),
            rng: StdRng::from_entropy(),
        }
    }

    /// Pinned clock and seeded RNG
    pub fn fixed(now: DateTime<Local>, seed: u64) -> Self {
        Self {
            clock: Box::new(move || now),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current time as seen by the time and date rules
    pub fn now(&self) -> DateTime<Local> {
        (self.clock)()
    }
}

impl Default for RuleContext {
    fn default() -> Self {
        Self::new()
    }
}

/// An utterance with its lower-cased view, computed once per dispatch
pub struct Utterance<'a> {
    pub raw: &'a str,
    pub lower: String,
}

impl<'a> Utterance<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase(),
        }
    }
}

/// One entry of the reply-selection table
pub struct Rule {
    /// Stable name used in logs and table audits
    pub name: &'static str,
    predicate: fn(&Utterance) -> bool,
    handler: fn(&Utterance, &mut RuleContext) -> Option<String>,
}

static RULES: &[Rule] = &[
    Rule { name: "greeting", predicate: is_greeting, handler: greeting_reply },
    Rule { name: "time", predicate: asks_time, handler: time_reply },
    Rule { name: "date", predicate: asks_date, handler: date_reply },
    Rule { name: "weather", predicate: asks_weather, handler: weather_reply },
    Rule { name: "joke", predicate: asks_joke, handler: joke_reply },
    Rule { name: "calculator", predicate: asks_calculation, handler: calculator_reply },
    Rule { name: "help", predicate: asks_help, handler: help_reply },
    Rule { name: "thanks", predicate: says_thanks, handler: thanks_reply },
    Rule { name: "farewell", predicate: says_farewell, handler: farewell_reply },
];

/// The ordered rule table
///
/// Exposed so rule order and precedence stay auditable.
pub fn rule_table() -> &'static [Rule] {
    RULES
}

/// Select a reply for the utterance
///
/// Walks the table in order; the first rule whose predicate matches and
/// whose handler produces a reply wins. Falls back to the echo sentence.
pub fn respond(input: &str, ctx: &mut RuleContext) -> String {
    let utterance = Utterance::new(input);
    for rule in RULES {
        if (rule.predicate)(&utterance) {
            if let Some(reply) = (rule.handler)(&utterance, ctx) {
                debug!("Rule '{}' matched: '{}'", rule.name, input);
                return reply;
            }
        }
    }

    debug!("No rule matched, echoing: '{}'", input);
    fallback_reply(input)
}

/// The no-match floor: echo the utterance inside the hint sentence
pub fn fallback_reply(raw: &str) -> String {
    format!(
        "I heard you say: \"{raw}\". I'm a simple voice agent. Try asking me about the time, date, for a joke, or simple calculations!"
    )
}

// === Predicates ===

fn is_greeting(u: &Utterance) -> bool {
    u.lower.contains("hello") || u.lower.contains("hi")
}

fn asks_time(u: &Utterance) -> bool {
    u.lower.contains("time")
}

fn asks_date(u: &Utterance) -> bool {
    u.lower.contains("date")
}

fn asks_weather(u: &Utterance) -> bool {
    u.lower.contains("weather")
}

fn asks_joke(u: &Utterance) -> bool {
    u.lower.contains("joke")
}

fn asks_calculation(u: &Utterance) -> bool {
    math::is_calculation_request(&u.lower)
}

fn asks_help(u: &Utterance) -> bool {
    u.lower.contains("help") || u.lower.contains("what can you do")
}

fn says_thanks(u: &Utterance) -> bool {
    u.lower.contains("thank")
}

fn says_farewell(u: &Utterance) -> bool {
    u.lower.contains("bye") || u.lower.contains("goodbye")
}

// === Handlers ===

fn greeting_reply(_u: &Utterance, _ctx: &mut RuleContext) -> Option<String> {
    Some("Hello! I'm your voice AI agent. How can I help you today?".to_string())
}

fn time_reply(_u: &Utterance, ctx: &mut RuleContext) -> Option<String> {
    let now = ctx.now();
    Some(format!("The current time is {}.", now.format("%-I:%M:%S %p")))
}

fn date_reply(_u: &Utterance, ctx: &mut RuleContext) -> Option<String> {
    let now = ctx.now();
    Some(format!("Today is {}.", now.format("%A, %B %-d, %Y")))
}

fn weather_reply(_u: &Utterance, _ctx: &mut RuleContext) -> Option<String> {
    Some(
        "I don't have access to real-time weather data, but you can check your local weather forecast online or through a weather app."
            .to_string(),
    )
}

fn joke_reply(_u: &Utterance, ctx: &mut RuleContext) -> Option<String> {
    let index = ctx.rng.gen_range(0..JOKES.len());
    Some(JOKES[index].to_string())
}

/// Declines when the utterance lacks two integers or an operator keyword,
/// so "calculate something" still reaches the fallback echo.
fn calculator_reply(u: &Utterance, _ctx: &mut RuleContext) -> Option<String> {
    math::parse_calculation(u.raw, &u.lower).map(|calc| calc.answer())
}

fn help_reply(_u: &Utterance, _ctx: &mut RuleContext) -> Option<String> {
    Some(
        "I can help you with time, date, simple calculations, tell jokes, and answer basic questions. Just speak naturally!"
            .to_string(),
    )
}

fn thanks_reply(_u: &Utterance, _ctx: &mut RuleContext) -> Option<String> {
    Some("You're welcome! Is there anything else I can help you with?".to_string())
}

fn farewell_reply(_u: &Utterance, _ctx: &mut RuleContext) -> Option<String> {
    Some("Goodbye! Have a great day!".to_string())
}
