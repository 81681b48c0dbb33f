//! `schemefinder prompt` — print the projected prompt without sending it.

use schemefinder_core::Profile;

use crate::ProfileArgs;

pub fn run(args: ProfileArgs) -> Result<(), Box<dyn std::error::Error>> {
    let profile = Profile::new(args.state, args.gender, args.income, args.age)?;
    println!("{}", schemefinder_retrieval::project(&profile));
    Ok(())
}
