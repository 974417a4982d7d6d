//! State command implementation
//!
//! Shows or clears the persisted alert state.

use crate::alerts::{AlertState, AlertStateStore};
use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, Message, StateTable};
use crate::config::Config;
use crate::domain::FriendlyNames;
use crate::error::Result;

/// Execute the state command
pub fn run_state(clear: bool, config: &Config, format: OutputFormat) -> Result<()> {
    let store = AlertStateStore::new(config.general.state_path());

    if clear {
        store.ensure_writable()?;
        let previous = store.load().len();
        store.save(&AlertState::new())?;

        log::info!("Cleared {} alert state entries", previous);
        print_output(
            &Message {
                message: format!(
                    "Cleared {} entries from {}",
                    previous,
                    store.path().display()
                ),
                success: true,
            },
            format,
        )?;
        return Ok(());
    }

    let state = store.try_load()?;
    let names = FriendlyNames::new().with_overrides(config.names.clone());
    print_output(&StateTable::build(store.path(), &state, &names), format)?;
    Ok(())
}
