//! vt-calc: estimate how many vision tokens an image occupies in a vision-language model

use anyhow::Result;

fn main() -> Result<()> {
    vt_calc::cli::run()
}
