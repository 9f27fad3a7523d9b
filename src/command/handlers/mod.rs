//! Command handlers
//!
//! Two registries feed the router: the intent table, keyed by the
//! classifier's tag, and the ordered keyword bands matched by substring.

pub mod basic;
pub mod custom;
pub mod features;
pub mod info;
pub mod lookup;
pub mod plugins;
pub mod profile;
pub mod scheduling;

use ahash::AHashMap;

use crate::command::parsed::{Intent, ParsedCommand};
use crate::command::reply::Reply;
use crate::session::SessionContext;

pub use features::keyword_handlers;

pub type IntentHandler = fn(&mut SessionContext, &ParsedCommand) -> Reply;

/// A feature group selected by substrings of the lowercased input
#[derive(Clone, Copy)]
pub struct KeywordHandler {
    pub group: &'static str,
    /// Receives the lowercased input
    pub matches: fn(&str) -> bool,
    /// Receives the input as typed
    pub handle: fn(&mut SessionContext, &str) -> Reply,
}

impl std::fmt::Debug for KeywordHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordHandler")
            .field("group", &self.group)
            .finish()
    }
}

/// Handler for every intent except `Unknown`
pub fn intent_handlers() -> AHashMap<Intent, IntentHandler> {
    let entries: [(Intent, IntentHandler); 37] = [
        (Intent::Greeting, basic::greeting),
        (Intent::Farewell, basic::farewell),
        (Intent::ThankYou, basic::thank_you),
        (Intent::Help, basic::help),
        (Intent::Status, basic::status),
        (Intent::Time, basic::time),
        (Intent::Date, basic::date),
        (Intent::Identity, basic::identity),
        (Intent::Capabilities, basic::capabilities),
        (Intent::UserIdentity, profile::user_identity),
        (Intent::UserNameSet, profile::user_name_set),
        (Intent::Weather, info::weather),
        (Intent::WebSearch, info::web_search),
        (Intent::Question, info::question),
        (Intent::Calculation, info::calculation),
        (Intent::MoreInfo, info::more_info),
        (Intent::Location, lookup::location),
        (Intent::Timezone, lookup::timezone),
        (Intent::SystemInfo, lookup::system_info),
        (Intent::News, lookup::news),
        (Intent::CryptoPrice, lookup::crypto_price),
        (Intent::CurrencyConvert, lookup::currency_convert),
        (Intent::GithubUser, lookup::github_user),
        (Intent::ShortenUrl, lookup::shorten_url),
        (Intent::WebsiteStatus, lookup::website_status),
        (Intent::SetTimer, scheduling::set_timer),
        (Intent::SetReminder, scheduling::set_reminder),
        (Intent::ListTimers, scheduling::list_timers),
        (Intent::ListReminders, scheduling::list_reminders),
        (Intent::CancelTimer, scheduling::cancel_timer),
        (Intent::CancelReminder, scheduling::cancel_reminder),
        (Intent::CustomCommandAdd, custom::custom_command_add),
        (Intent::CustomCommandList, custom::custom_command_list),
        (Intent::CustomCommandRemove, custom::custom_command_remove),
        (Intent::ListPlugins, plugins::list_plugins),
        (Intent::LoadPlugin, plugins::load_plugin),
        (Intent::PluginCommand, plugins::plugin_command),
    ];
    entries.into_iter().collect()
}
