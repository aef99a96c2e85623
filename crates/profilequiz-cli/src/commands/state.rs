use clap::Subcommand;
use profilequiz_core::SessionStore;

#[derive(Subcommand)]
pub enum StateAction {
    /// Print the stored session of a quiz as JSON
    Show {
        /// Content id (defaults to the content file stem when playing)
        id: String,
    },
    /// Forget the stored session of a quiz
    Clear { id: String },
}

pub fn run(action: StateAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::open()?;
    match action {
        StateAction::Show { id } => match store.load(&id) {
            Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            None => println!("no stored session for {id}"),
        },
        StateAction::Clear { id } => {
            if store.clear(&id)? {
                println!("session cleared: {id}");
            } else {
                println!("no stored session for {id}");
            }
        }
    }
    Ok(())
}
