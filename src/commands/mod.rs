//! This module aggregates all the command modules for the bot.

/// Commands related to music playback, plus the per-guild playback core behind them.
pub mod music;
