//! Structure-preserving tree walker.
//!
//! Produces a tree with exactly the input's shape in which every non-empty
//! string leaf has been localized. Leaves are processed strictly one at a
//! time in document order, with a pacing delay between provider calls.

use crate::content::{ContentMap, ContentNode};
use crate::i18n::LanguageDescriptor;
use crate::orchestrator::Orchestrator;
use crate::pacing::Pacer;
use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

pub struct TreeWalker<'a> {
    orchestrator: &'a Orchestrator,
    target: &'a LanguageDescriptor,
    pacer: Pacer,
}

impl<'a> TreeWalker<'a> {
    pub fn new(orchestrator: &'a Orchestrator, target: &'a LanguageDescriptor, pacer: Pacer) -> Self {
        Self {
            orchestrator,
            target,
            pacer,
        }
    }

    /// Localize a whole tree.
    pub async fn walk(&mut self, node: &ContentNode) -> ContentNode {
        self.walk_from(String::new(), node).await
    }

    /// Localize a subtree whose key path starts at `path` (used in log events).
    pub fn walk_from<'s>(&'s mut self, path: String, node: &'s ContentNode) -> BoxFuture<'s, ContentNode> {
        async move {
            match node {
                ContentNode::Text(text) => self.leaf(&path, text).await,
                ContentNode::List(items) => {
                    let mut localized = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        let child = format!("{}[{}]", path, index);
                        localized.push(self.walk_from(child, item).await);
                    }
                    ContentNode::List(localized)
                }
                ContentNode::Map(map) => {
                    let mut localized = ContentMap::with_capacity(map.len());
                    for (key, value) in map {
                        let child = if path.is_empty() {
                            key.clone()
                        } else {
                            format!("{}.{}", path, key)
                        };
                        let result = self.walk_from(child, value).await;
                        localized.insert(key.clone(), result);
                    }
                    ContentNode::Map(localized)
                }
                scalar => scalar.clone(),
            }
        }
        .boxed()
    }

    async fn leaf(&mut self, path: &str, text: &str) -> ContentNode {
        self.orchestrator.metrics().record_leaf();
        if text.is_empty() {
            return ContentNode::text("");
        }

        self.pacer.ready().await;
        let localized = self.orchestrator.localize(text, self.target).await;
        self.pacer.mark();

        debug!(language = self.target.code, key = path, "Localized leaf");
        ContentNode::Text(localized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::tests::{describe, scripted, uppercase, uppercase_tree};
    use crate::providers::ProviderId;
    use proptest::prelude::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn parse(json: &str) -> ContentNode {
        serde_json::from_str(json).expect("Should parse")
    }

    // ==================== walk Tests ====================

    #[tokio::test]
    async fn test_walk_uppercases_strings_and_keeps_scalars() {
        let (orchestrator, calls) = uppercase();
        let mut walker = TreeWalker::new(&orchestrator, describe("fr"), Pacer::disabled());

        let result = walker.walk(&parse(r#"{"nav": {"home": "Home", "count": 3}}"#)).await;

        assert_eq!(result, parse(r#"{"nav": {"home": "HOME", "count": 3}}"#));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_walk_nested_lists_and_mappings() {
        let (orchestrator, calls) = uppercase();
        let mut walker = TreeWalker::new(&orchestrator, describe("de"), Pacer::disabled());

        let input = parse(r#"{"items": [{"title": "a", "tags": ["b", "c"]}, null, true, 1.5]}"#);
        let result = walker.walk(&input).await;

        assert_eq!(
            result,
            parse(r#"{"items": [{"title": "A", "tags": ["B", "C"]}, null, true, 1.5]}"#)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_walk_scalars_only_makes_no_calls() {
        let (orchestrator, calls) = uppercase();
        let mut walker = TreeWalker::new(&orchestrator, describe("fr"), Pacer::disabled());

        let input = parse(r#"{"n": 1, "b": false, "z": null, "l": [2, 3]}"#);
        assert_eq!(walker.walk(&input).await, input);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_walk_empty_strings_make_no_calls() {
        let (orchestrator, calls) = uppercase();
        let mut walker = TreeWalker::new(&orchestrator, describe("fr"), Pacer::disabled());

        let input = parse(r#"{"a": "", "b": [""]}"#);
        assert_eq!(walker.walk(&input).await, input);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_walk_keeps_source_text_when_all_providers_fail() {
        let (orchestrator, _journal) = scripted(&[]);
        let mut walker = TreeWalker::new(&orchestrator, describe("ja"), Pacer::disabled());

        let input = parse(r#"{"title": "Hotels", "n": 2}"#);
        assert_eq!(walker.walk(&input).await, input);
        assert_eq!(orchestrator.metrics().exhausted(), 1);
    }

    #[tokio::test]
    async fn test_walk_uses_fallback_result() {
        let (orchestrator, journal) = scripted(&[ProviderId::OpenAi]);
        let mut walker = TreeWalker::new(&orchestrator, describe("zh"), Pacer::disabled());

        let result = walker.walk(&parse(r#"{"title": "Hotels"}"#)).await;
        assert_eq!(result, parse(r#"{"title": "[openai] Hotels"}"#));
        assert_eq!(
            *journal.lock().unwrap(),
            vec![ProviderId::DeepSeek, ProviderId::OpenAi]
        );
    }

    #[tokio::test]
    async fn test_walk_preserves_key_order() {
        let (orchestrator, _calls) = uppercase();
        let mut walker = TreeWalker::new(&orchestrator, describe("fr"), Pacer::disabled());

        let result = walker.walk(&parse(r#"{"z": "1", "a": "2", "m": "3"}"#)).await;
        let keys: Vec<_> = result.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    // ==================== Pacing Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_walk_paces_consecutive_leaves() {
        let (orchestrator, _calls) = uppercase();
        let mut walker = TreeWalker::new(
            &orchestrator,
            describe("fr"),
            Pacer::new(Duration::from_millis(200)),
        );
        let start = tokio::time::Instant::now();

        walker.walk(&parse(r#"["a", "b", "c"]"#)).await;

        // Three calls, two gaps
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_walk_does_not_pace_skipped_leaves() {
        let (orchestrator, _calls) = uppercase();
        let mut walker = TreeWalker::new(
            &orchestrator,
            describe("fr"),
            Pacer::new(Duration::from_millis(200)),
        );
        let start = tokio::time::Instant::now();

        walker.walk(&parse(r#"["a", "", 1, null]"#)).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    // ==================== Property Tests ====================

    fn arb_node() -> impl Strategy<Value = ContentNode> {
        let leaf = prop_oneof![
            Just(ContentNode::Null),
            any::<bool>().prop_map(ContentNode::Bool),
            any::<i64>().prop_map(|n| ContentNode::Number(n.into())),
            "[a-z {}]{0,12}".prop_map(ContentNode::Text),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(ContentNode::List),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..6)
                    .prop_map(|entries| ContentNode::Map(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_walk_preserves_shape(input in arb_node()) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let (orchestrator, _calls) = uppercase();

            let output = runtime.block_on(async {
                let mut walker = TreeWalker::new(&orchestrator, describe("it"), Pacer::disabled());
                walker.walk(&input).await
            });

            prop_assert!(output.same_shape(&input));
            prop_assert_eq!(output, uppercase_tree(&input));
        }
    }
}
