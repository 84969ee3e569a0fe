mod injector;
mod strategy;

pub use injector::{InjectorTiming, PasteError, PasteInjector, PasteReport, StrategyAttempt};
pub use strategy::{default_chain, KeyChordPaste, PasteStrategy, ScriptedPaste, StrategyOutcome};
