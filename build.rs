use anyhow::Result;
use vergen::EmitBuilder;

fn main() -> Result<()> {
    // optionally emit git branch and hash
    // failure is not fatal, e.g. when building from a source tarball
    let _ = EmitBuilder::builder()
        .git_branch()
        .git_sha(true)
        .fail_on_error()
        .quiet()
        .emit();
    Ok(())
}
