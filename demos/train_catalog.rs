//! Train a disposition model on a local catalog export and print the
//! held-out accuracy plus the ranked feature importances.
//!
//! Usage: `cargo run --example train_catalog -- <kepler|k2|tess> <path.csv>`
use anyhow::{bail, Context, Result};

use exovet_classifiers::catalogs;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(catalog), Some(path)) = (args.next(), args.next()) else {
        bail!("usage: train_catalog <kepler|k2|tess> <path.csv>");
    };

    let mut classifier = match catalog.as_str() {
        "kepler" => catalogs::kepler(),
        "k2" => catalogs::k2(),
        "tess" | "toi" => catalogs::tess(),
        other => bail!("unknown catalog '{}'", other),
    };

    let accuracy = classifier
        .load_and_train(&path)
        .with_context(|| format!("training {} model from {}", classifier.name(), path))?;
    println!("{} held-out accuracy: {:.3}", classifier.name(), accuracy);

    println!("top features:");
    for entry in classifier.feature_importance(10)? {
        let explanation = catalogs::feature_explanations()
            .iter()
            .find(|(name, _)| *name == entry.feature)
            .map(|(_, text)| *text)
            .unwrap_or("");
        println!("  {:<14} {:.4}  {}", entry.feature, entry.importance, explanation);
    }

    Ok(())
}
