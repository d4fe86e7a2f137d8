use std::{env, process};

use movie_catalog::{
    cli::{output, run_cli},
    init,
};

fn main() {
    init();

    if let Err(err) = run_cli(env::args().skip(1)) {
        output::error(err);
        process::exit(1);
    }
}
