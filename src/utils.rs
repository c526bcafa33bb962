/// Write an error followed by every `source` in its chain. Meant for `Debug`
/// impls, so that `{:?}` in logs shows the whole story while `Display` stays
/// short enough to hand to a visitor.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
