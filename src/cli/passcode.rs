//! Passcode CLI commands and the unlock prompt

use clap::Subcommand;
use zeroize::Zeroizing;

use crate::error::{LedgerError, LedgerResult};
use crate::services::PasscodeService;
use crate::storage::Storage;

/// Passcode subcommands
#[derive(Subcommand)]
pub enum PasscodeCommands {
    /// Show whether a passcode is set
    Status,

    /// Set a passcode (4 digits); prompts when omitted
    Set {
        passcode: Option<String>,
    },

    /// Change the passcode; the current one is the passcode used to unlock
    Change {
        /// New passcode; prompts when omitted
        new: Option<String>,
    },

    /// Remove the passcode
    Clear,
}

/// Handle a passcode command; `current` is the passcode the session was unlocked with
pub fn handle_passcode_command(
    storage: &Storage,
    current: Option<&str>,
    cmd: PasscodeCommands,
) -> LedgerResult<()> {
    let service = PasscodeService::new(storage);

    match cmd {
        PasscodeCommands::Status => {
            if service.is_set()? {
                println!("Passcode: SET");
            } else {
                println!("Passcode: not set");
                println!("Run 'ledgernote passcode set' to lock your data.");
            }
        }

        PasscodeCommands::Set { passcode } => {
            let (passcode, confirm) = new_passcode(passcode)?;
            service.set(&passcode, &confirm)?;
            println!("Passcode set.");
        }

        PasscodeCommands::Change { new } => {
            let current = current.unwrap_or_default();
            let (passcode, confirm) = new_passcode(new)?;
            service.change(current, &passcode, &confirm)?;
            println!("Passcode changed.");
        }

        PasscodeCommands::Clear => {
            service.clear(current.unwrap_or_default())?;
            println!("Passcode removed.");
        }
    }

    Ok(())
}

/// A new passcode and its confirmation, from the argument or two prompts
fn new_passcode(given: Option<String>) -> LedgerResult<(Zeroizing<String>, Zeroizing<String>)> {
    match given {
        Some(passcode) => {
            let passcode = Zeroizing::new(passcode);
            let confirm = passcode.clone();
            Ok((passcode, confirm))
        }
        None => {
            let passcode = prompt_passcode("New passcode (4 digits): ")?;
            let confirm = prompt_passcode("Confirm passcode: ")?;
            Ok((passcode, confirm))
        }
    }
}

/// Prompt for a passcode without echo
pub fn prompt_passcode(prompt: &str) -> LedgerResult<Zeroizing<String>> {
    rpassword::prompt_password(prompt)
        .map(Zeroizing::new)
        .map_err(|e| LedgerError::Passcode(format!("Failed to read passcode: {}", e)))
}

/// Check the session passcode when one is set
///
/// Uses `given` when present, otherwise prompts. Returns the verified
/// passcode, or `None` when the data is not locked.
pub fn unlock(storage: &Storage, given: Option<String>) -> LedgerResult<Option<Zeroizing<String>>> {
    let service = PasscodeService::new(storage);
    if !service.is_set()? {
        return Ok(given.map(Zeroizing::new));
    }

    let input = match given {
        Some(passcode) => Zeroizing::new(passcode),
        None => prompt_passcode("Passcode: ")?,
    };

    if service.verify(&input)? {
        Ok(Some(input))
    } else {
        Err(LedgerError::Passcode("Incorrect passcode".into()))
    }
}
