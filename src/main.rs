use anyhow::Result;

fn main() -> Result<()> {
    studykit::cli::run()
}
