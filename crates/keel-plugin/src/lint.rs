//! Detects rules that can never fire because an earlier plugin claims the same input.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::HookStage;
use crate::plugin::Plugin;

/// A rule in `shadowed` that an identical rule in `winner` always takes precedence over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOverlap {
    pub stage: HookStage,
    pub filter: String,
    /// Namespace restriction of the shadowed rule.
    pub namespace: Option<String>,
    pub winner: String,
    pub shadowed: String,
}

impl fmt::Display for RuleOverlap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rule /{}/ in plugin '{}' is shadowed by plugin '{}', which was attached first",
            self.stage, self.filter, self.shadowed, self.winner
        )
    }
}

/// Rules with the same filter source and overlapping namespace restriction, in
/// different attachments. Plugins are told apart by position, so one plugin attached
/// twice, or two plugins sharing a name, still report. Each shadowed rule is reported
/// once, against its first winner.
pub fn find_overlaps(plugins: &[Arc<Plugin>]) -> Vec<RuleOverlap> {
    let resolve = plugins.iter().enumerate().flat_map(|(slot, plugin)| {
        plugin
            .resolve_rules()
            .iter()
            .map(move |rule| (HookStage::Resolve, slot, plugin.name(), rule.filter().as_str(), rule.namespace()))
    });
    let load = plugins.iter().enumerate().flat_map(|(slot, plugin)| {
        plugin
            .load_rules()
            .iter()
            .map(move |rule| (HookStage::Load, slot, plugin.name(), rule.filter().as_str(), rule.namespace()))
    });
    let rules: Vec<_> = resolve.chain(load).collect();

    let mut overlaps = Vec::new();
    for (i, &(stage, slot, shadowed, filter, namespace)) in rules.iter().enumerate() {
        let winner = rules[..i].iter().find(|&&(s, other, _, f, ns)| {
            s == stage && other != slot && f == filter && restrictions_overlap(ns, namespace)
        });
        if let Some(&(_, _, winner, _, _)) = winner {
            overlaps.push(RuleOverlap {
                stage,
                filter: filter.to_string(),
                namespace: namespace.map(str::to_string),
                winner: winner.to_string(),
                shadowed: shadowed.to_string(),
            });
        }
    }
    overlaps
}

fn restrictions_overlap(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, _) | (_, None) => true,
        (Some(a), Some(b)) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::ResolveOutcome;

    fn resolver(name: &str, filter: &str, namespace: Option<&str>) -> Arc<Plugin> {
        let builder = Plugin::builder(name);
        let handler = |args: &crate::hooks::ResolveArgs| Ok(ResolveOutcome::path(&args.specifier));
        let builder = match namespace {
            Some(ns) => builder.on_resolve_in(filter, ns, handler),
            None => builder.on_resolve(filter, handler),
        };
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn same_filter_in_two_plugins_is_reported() {
        let plugins = vec![
            resolver("first", "^react$", None),
            resolver("second", "^react$", Some("file")),
        ];
        let overlaps = find_overlaps(&plugins);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].winner, "first");
        assert_eq!(overlaps[0].shadowed, "second");
        assert_eq!(overlaps[0].stage, HookStage::Resolve);
        assert!(overlaps[0].to_string().contains("shadowed by plugin 'first'"));
    }

    #[test]
    fn disjoint_namespaces_do_not_overlap() {
        let plugins = vec![
            resolver("a", ".*", Some("virtual")),
            resolver("b", ".*", Some("http")),
        ];
        assert!(find_overlaps(&plugins).is_empty());
    }

    #[test]
    fn rules_within_one_plugin_are_not_reported() {
        let plugin = Plugin::builder("self")
            .on_resolve("^x$", |args| Ok(ResolveOutcome::path(&args.specifier)))
            .on_resolve("^x$", |args| Ok(ResolveOutcome::external(&args.specifier)))
            .build()
            .unwrap();
        assert!(find_overlaps(&[Arc::new(plugin)]).is_empty());
    }

    #[test]
    fn plugin_attached_twice_shadows_itself() {
        let plugin = resolver("twice", "^lodash$", None);
        let overlaps = find_overlaps(&[plugin.clone(), plugin]);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].winner, "twice");
        assert_eq!(overlaps[0].shadowed, "twice");
    }

    #[test]
    fn plugins_sharing_a_name_are_still_compared() {
        let plugins = vec![resolver("dup", "^a$", None), resolver("dup", "^a$", Some("file"))];
        assert_eq!(find_overlaps(&plugins).len(), 1);
    }

    #[test]
    fn different_filters_do_not_overlap() {
        let plugins = vec![resolver("a", "^a", None), resolver("b", "^b", None)];
        assert!(find_overlaps(&plugins).is_empty());
    }
}
