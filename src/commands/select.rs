use anyhow::Result;
use hearth_core::Hearth;

pub fn run(
    hearth: &Hearth,
    id: Option<&str>,
    off: bool,
    all: bool,
    none: bool,
    with_events: bool,
) -> Result<()> {
    match (id, all, none, with_events) {
        (Some(id), false, false, false) => {
            if !hearth.get_registry().iter().any(|c| c.id == id) {
                anyhow::bail!("no calendar with id '{id}'");
            }
            hearth.set_selected(id, !off);
        }
        (None, true, false, false) => hearth.select_all(),
        (None, false, true, false) => hearth.clear_selection(),
        (None, false, false, true) => hearth.select_only_with_events(),
        _ => anyhow::bail!("pass a calendar id, or exactly one of --all / --none / --with-events"),
    }

    let selection = hearth.get_selection();
    println!("{} calendar(s) selected", selection.len());
    Ok(())
}
