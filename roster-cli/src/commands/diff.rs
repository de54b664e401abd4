//! `roster diff`: unified diffs of the attributes sync would write.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use roster_directory::TaskRouterClient;
use roster_sync::diff_plan;

use super::{fetch_plan, load_config, InputArgs};

/// Arguments for `roster diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

impl DiffArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let inputs = self.input.load()?;
        let client = TaskRouterClient::new(&config);
        let plan = fetch_plan(&client, &config, &inputs)?;

        let diffs = diff_plan(&plan);
        if diffs.is_empty() {
            println!("No differences for '{}'.", self.input.workers.display());
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}
