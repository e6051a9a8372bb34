//! Browser host of the PixelDeck console.
//!
//! Options are read from the location hash, e.g. `#--seed=42&--api=http://localhost:8000&-vv`.

use clap::Parser;
use wasm_bindgen::prelude::*;

mod api;
mod console_view;
mod settings;
mod utils;

#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random, numbers are used as is and text is hashed
    #[arg(short, long)]
    seed: Option<String>,

    /// Base URL of the REST API
    #[arg(long, default_value = "")]
    api: String,
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window().location().hash().unwrap_or_default();
    let (args, parse_error) = match Args::try_parse_from(location_hash.split(['#', '&'])) {
        Ok(args) => (args, None),
        Err(err) => (Args::default(), Some(err)),
    };
    if let Some(log_level) = args.verbose.log_level() {
        if let Err(err) = console_log::init_with_level(log_level) {
            gloo::console::error!(format!("could not initialize logger: {err}"));
        }
    }
    if let Some(err) = parse_error {
        log::error!("ignoring options in {:?}: {}", location_hash, err);
    }
    log::debug!("seed: {:?}, api: {:?}", args.seed, args.api);

    let Some(root) = document().get_element_by_id("console") else {
        log::error!("could not find id=\"console\" element");
        return;
    };

    let props = console_view::ConsoleProps {
        seed: args.seed.as_deref().map(utils::seed_from_arg),
        api: args.api,
    };
    log::debug!("App started");
    yew::Renderer::<console_view::ConsoleView>::with_root_and_props(root, props).render();
}
