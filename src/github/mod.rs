// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub-facing fetchers (repositories, calendar, comparisons, events) over a pluggable upstream client
// role: github/root
// outputs: Re-exports submodules; no logic here
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod calendar;
pub mod compare;
pub mod events;
pub mod repos;

#[cfg(test)]
pub(crate) mod testing;
