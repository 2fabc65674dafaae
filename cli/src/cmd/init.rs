use anyhow::ensure;
use snipcheck_core::{action, print_success};

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {}

pub fn exec(_: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    ensure!(
        global_args.anki_profile.is_none(),
        "`init` writes a config file into a directory; it does not apply to Anki profiles"
    );

    let path = action::init_snippet_dir(global_args.target_dir())?;
    print_success!(
        "Wrote example config. (path: {})",
        util::replace_homedir_to_tilde(path).to_string_lossy()
    );
    Ok(0)
}
