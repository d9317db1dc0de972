//! # Outfit Stylist
//!
//! Produces exactly one ordered triple of wardrobe items covering
//! {top, bottom, shoes} from an inspiration image, a free-text goal, and a
//! wardrobe snapshot.
//!
//! The AI call is an untrusted suggestion generator, never the source of
//! truth: the reconcile pass re-derives a valid three-role outfit from
//! whatever comes back, and the same pass backs the random fallback path.
//! External failures degrade to the fallback; the caller always receives a
//! structurally valid result.

use std::collections::HashSet;
use std::sync::Arc;

use base64::Engine;
use rand::seq::SliceRandom;

use crate::categories::normalize;
use crate::models::{Recommendation, WardrobeEntry};
use crate::traits::{ChatMessage, ChatModel};

/// Display precedence for the three resolved slots. Categories not listed
/// here (including the "No match" placeholder) sort last.
const PREFERRED_ORDER: [&str; 4] = ["outerwear", "tops", "bottoms", "shoes"];

const CAPTION_INSTRUCTION: &str =
    "Describe this outfit, covering the top, the bottom and the shoes in separate sentences.";

const SELECTION_INSTRUCTION: &str = "You are a virtual stylist. From the wardrobe JSON choose \
     one TOP (outerwear or tops), one BOTTOM (bottoms) and one pair of SHOES. \
     Return them in that exact order as a JSON array of objects copied verbatim from the wardrobe.";

/// Injectable randomness for the fallback path. The default shuffles
/// uniformly; tests supply a fixed ordering to pin the selection down.
pub type ShuffleFn = Arc<dyn Fn(&mut Vec<WardrobeEntry>) + Send + Sync>;

pub struct OutfitStylist {
    chat: Option<Arc<dyn ChatModel>>,
    shuffle: ShuffleFn,
}

impl OutfitStylist {
    /// `chat: None` is a valid configuration that forces the random
    /// fallback path, not an initialization error.
    pub fn new(chat: Option<Arc<dyn ChatModel>>) -> Self {
        Self {
            chat,
            shuffle: Arc::new(|entries| entries.shuffle(&mut rand::thread_rng())),
        }
    }

    /// Swap the randomness source.
    pub fn with_shuffle(mut self, shuffle: ShuffleFn) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Runs the full pipeline. Infallible by design: AI degradation is
    /// logged and absorbed, never surfaced.
    pub async fn generate(
        &self,
        image: &[u8],
        content_type: &str,
        prompt: &str,
        wardrobe: &[WardrobeEntry],
    ) -> Recommendation {
        let inspiration = encode_data_uri(image, content_type);

        let candidates = match &self.chat {
            Some(chat) => match self
                .suggest(chat.as_ref(), &inspiration, prompt, wardrobe)
                .await
            {
                Ok(picks) => picks,
                Err(err) => {
                    log::warn!("stylist degraded to random fallback: {err:#}");
                    self.random_candidates(wardrobe)
                }
            },
            None => {
                log::warn!("no chat model configured; using random outfit fallback");
                self.random_candidates(wardrobe)
            }
        };

        let mut items = reconcile(&candidates, wardrobe);
        sort_by_preferred_order(&mut items);

        Recommendation {
            inspiration_image: inspiration,
            prompt: prompt.to_string(),
            items,
        }
    }

    /// CAPTION then SELECT: two strictly sequential chat calls (the
    /// selection prompt embeds the caption).
    async fn suggest(
        &self,
        chat: &dyn ChatModel,
        image_uri: &str,
        prompt: &str,
        wardrobe: &[WardrobeEntry],
    ) -> anyhow::Result<Vec<WardrobeEntry>> {
        let caption = chat
            .chat(vec![ChatMessage::with_image(
                "user",
                image_uri,
                CAPTION_INSTRUCTION,
            )])
            .await?;

        let wardrobe_json = serde_json::to_string(wardrobe)?;
        let raw = chat
            .chat(vec![
                ChatMessage::text("system", SELECTION_INSTRUCTION),
                ChatMessage::text(
                    "user",
                    format!(
                        "Wardrobe JSON:\n{wardrobe_json}\n\n\
                         Image caption: \"{caption}\"\n\
                         Styling goal: \"{prompt}\"\n\n\
                         Return ONLY the JSON array."
                    ),
                ),
            ])
            .await?;

        // A garbled selection is not an error; reconcile absorbs an empty list.
        Ok(parse_selection(&raw))
    }

    fn random_candidates(&self, wardrobe: &[WardrobeEntry]) -> Vec<WardrobeEntry> {
        let mut pool = wardrobe.to_vec();
        (self.shuffle)(&mut pool);
        pool.truncate(3);
        pool
    }
}

fn encode_data_uri(image: &[u8], content_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        base64::engine::general_purpose::STANDARD.encode(image)
    )
}

/// Parses the selection response. Anything that is not a JSON array of
/// wardrobe-shaped objects yields an empty candidate list.
fn parse_selection(raw: &str) -> Vec<WardrobeEntry> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    serde_json::from_str(trimmed).unwrap_or_default()
}

// Role-bucket membership, classified through the registry so legacy
// spellings (Jackets/Shirts/Pants/Shorts) and canonical names land in the
// same bucket.
fn is_top_like(category: &str) -> bool {
    matches!(normalize(Some(category)).id, "outerwear" | "tops")
}

fn is_bottom_like(category: &str) -> bool {
    normalize(Some(category)).id == "bottoms"
}

fn is_shoes(category: &str) -> bool {
    normalize(Some(category)).id == "shoes"
}

/// Slot filler for a role bucket with no coverage anywhere in the wardrobe.
fn no_match_placeholder() -> WardrobeEntry {
    WardrobeEntry {
        id: None,
        name: "No match".to_string(),
        category: "Other".to_string(),
        image_url: String::new(),
    }
}

/// Structural-correction pass. Always runs, whether the candidates came
/// from the AI selection or the random fallback.
///
/// Pure function of (candidates, wardrobe): deduplicates candidates by
/// canonical category (first occurrence wins), then fills the three roles
/// in [TOP, BOTTOM, SHOES] order — matching candidate first, then the first
/// unconsumed wardrobe item in the bucket, then the placeholder. Every
/// candidate matched back to the wardrobe is marked consumed up front so
/// one physical item can never fill two roles.
pub fn reconcile(candidates: &[WardrobeEntry], wardrobe: &[WardrobeEntry]) -> Vec<WardrobeEntry> {
    let mut seen = HashSet::new();
    let mut distinct: Vec<&WardrobeEntry> = Vec::new();
    for cand in candidates {
        if seen.insert(normalize(Some(&cand.category)).id) {
            distinct.push(cand);
        }
    }

    let top_pick = distinct.iter().copied().find(|c| is_top_like(&c.category));
    let bottom_pick = distinct.iter().copied().find(|c| is_bottom_like(&c.category));
    let shoes_pick = distinct.iter().copied().find(|c| is_shoes(&c.category));

    let mut consumed: HashSet<usize> = HashSet::new();
    for pick in [top_pick, bottom_pick, shoes_pick].into_iter().flatten() {
        if let Some(idx) = find_in_wardrobe(pick, wardrobe) {
            consumed.insert(idx);
        }
    }

    let roles: [(Option<&WardrobeEntry>, fn(&str) -> bool); 3] = [
        (top_pick, is_top_like),
        (bottom_pick, is_bottom_like),
        (shoes_pick, is_shoes),
    ];

    let mut resolved = Vec::with_capacity(3);
    for (pick, in_bucket) in roles {
        let item = match pick {
            Some(pick) => pick.clone(),
            None => pick_unique(in_bucket, wardrobe, &mut consumed)
                .unwrap_or_else(no_match_placeholder),
        };
        resolved.push(item);
    }
    resolved
}

/// First-match-wins indexed scan over the snapshot, skipping items already
/// consumed by an earlier role.
fn pick_unique(
    in_bucket: fn(&str) -> bool,
    wardrobe: &[WardrobeEntry],
    consumed: &mut HashSet<usize>,
) -> Option<WardrobeEntry> {
    let (idx, item) = wardrobe
        .iter()
        .enumerate()
        .find(|(i, w)| in_bucket(&w.category) && !consumed.contains(i))?;
    consumed.insert(idx);
    Some(item.clone())
}

/// Matches an AI candidate back to its physical wardrobe slot: by id when
/// the model copied it faithfully, by (image, category) otherwise.
fn find_in_wardrobe(pick: &WardrobeEntry, wardrobe: &[WardrobeEntry]) -> Option<usize> {
    wardrobe.iter().position(|w| match (pick.id, w.id) {
        (Some(a), Some(b)) => a == b,
        _ => !pick.image_url.is_empty()
            && w.image_url == pick.image_url
            && w.category == pick.category,
    })
}

/// Stable sort by the fixed display precedence.
pub fn sort_by_preferred_order(items: &mut [WardrobeEntry]) {
    items.sort_by_key(|item| {
        let id = normalize(Some(&item.category)).id;
        PREFERRED_ORDER
            .iter()
            .position(|p| *p == id)
            .unwrap_or(PREFERRED_ORDER.len())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    fn entry(n: u128, category: &str) -> WardrobeEntry {
        WardrobeEntry {
            id: Some(Uuid::from_u128(n)),
            name: format!("item-{n}"),
            category: category.to_string(),
            image_url: format!("/media/{n}"),
        }
    }

    fn identity_shuffle() -> ShuffleFn {
        Arc::new(|_entries: &mut Vec<WardrobeEntry>| {})
    }

    /// Replays a fixed reply per call, in order.
    struct ScriptedChat {
        replies: Mutex<Vec<String>>,
    }

    impl ScriptedChat {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedChat {
        async fn chat(&self, _messages: Vec<ChatMessage>) -> anyhow::Result<String> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                anyhow::bail!("script exhausted");
            }
            Ok(replies.remove(0))
        }
    }

    fn assert_covers_roles(items: &[WardrobeEntry]) {
        assert_eq!(items.len(), 3);
        assert_eq!(items.iter().filter(|i| is_top_like(&i.category)).count(), 1);
        assert_eq!(items.iter().filter(|i| is_bottom_like(&i.category)).count(), 1);
        assert_eq!(items.iter().filter(|i| is_shoes(&i.category)).count(), 1);
        let ids: Vec<_> = items.iter().filter_map(|i| i.id).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len(), "physical item used twice");
    }

    #[test]
    fn reconcile_fills_all_roles_from_empty_candidates() {
        let wardrobe = [entry(1, "Jackets"), entry(2, "Pants"), entry(3, "Shoes")];
        let items = reconcile(&[], &wardrobe);
        assert_covers_roles(&items);
    }

    #[test]
    fn reconcile_inserts_placeholder_for_missing_bucket() {
        let wardrobe = [entry(1, "Shirts"), entry(2, "Shorts")];
        let items = reconcile(&[], &wardrobe);
        assert_eq!(items.len(), 3);
        let placeholder = &items[2];
        assert_eq!(placeholder.category, "Other");
        assert_eq!(placeholder.name, "No match");
        assert_eq!(placeholder.image_url, "");
        assert_eq!(placeholder.id, None);
    }

    #[test]
    fn reconcile_dedups_candidates_by_category() {
        let wardrobe = [
            entry(1, "Shirts"),
            entry(2, "Shirts"),
            entry(3, "Pants"),
            entry(4, "Shoes"),
        ];
        // Two tops suggested; only the first may survive.
        let candidates = [
            wardrobe[1].clone(),
            wardrobe[0].clone(),
            wardrobe[2].clone(),
            wardrobe[3].clone(),
        ];
        let items = reconcile(&candidates, &wardrobe);
        assert_covers_roles(&items);
        assert_eq!(items[0].id, Some(Uuid::from_u128(2)));
    }

    #[test]
    fn reconcile_keeps_ai_picks_and_backfills_the_rest() {
        let wardrobe = [
            entry(1, "Pants"),
            entry(2, "Pants"),
            entry(3, "Shirts"),
            entry(4, "Shoes"),
        ];
        let candidates = [wardrobe[1].clone()];
        let items = reconcile(&candidates, &wardrobe);
        assert_covers_roles(&items);
        // AI bottom pick honored; top and shoes backfilled by wardrobe scan.
        assert_eq!(items[1].id, Some(Uuid::from_u128(2)));
        assert_eq!(items[0].id, Some(Uuid::from_u128(3)));
        assert_eq!(items[2].id, Some(Uuid::from_u128(4)));
    }

    #[test]
    fn sort_follows_display_precedence() {
        let mut items = vec![entry(1, "Shoes"), entry(2, "Shirts"), entry(3, "Pants")];
        sort_by_preferred_order(&mut items);
        let order: Vec<_> = items.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(order, ["Shirts", "Pants", "Shoes"]);
    }

    #[test]
    fn parse_selection_tolerates_fences_and_garbage() {
        assert_eq!(parse_selection("nonsense, not json"), vec![]);
        assert_eq!(parse_selection("{\"not\": \"an array\"}"), vec![]);
        let fenced = "```json\n[{\"category\": \"Shirts\"}]\n```";
        let parsed = parse_selection(fenced);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].category, "Shirts");
    }

    #[tokio::test]
    async fn no_chat_model_with_fixed_shuffle_is_deterministic() {
        let stylist = OutfitStylist::new(None).with_shuffle(identity_shuffle());
        let wardrobe = [entry(1, "Jackets"), entry(2, "Pants"), entry(3, "Shoes")];
        let rec = stylist
            .generate(b"img", "image/png", "casual friday", &wardrobe)
            .await;

        let ids: Vec<_> = rec.items.iter().filter_map(|i| i.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)]
        );
        assert!(rec.inspiration_image.starts_with("data:image/png;base64,"));
        assert_eq!(rec.prompt, "casual friday");
    }

    #[tokio::test]
    async fn random_fallback_is_still_structurally_valid() {
        let stylist = OutfitStylist::new(None);
        let wardrobe = [
            entry(1, "Shirts"),
            entry(2, "Jackets"),
            entry(3, "Pants"),
            entry(4, "Shorts"),
            entry(5, "Shoes"),
        ];
        for _ in 0..2 {
            let rec = stylist.generate(b"img", "image/jpeg", "", &wardrobe).await;
            assert_covers_roles(&rec.items);
        }
    }

    #[tokio::test]
    async fn malformed_selection_behaves_like_empty_array() {
        let chat = Arc::new(ScriptedChat::new(&[
            "A denim jacket over a white tee.",
            "sorry, I can't produce JSON today",
        ]));
        let stylist = OutfitStylist::new(Some(chat));
        let wardrobe = [entry(1, "Jackets"), entry(2, "Pants"), entry(3, "Shoes")];
        let rec = stylist.generate(b"img", "image/png", "date night", &wardrobe).await;
        assert_covers_roles(&rec.items);
    }

    #[tokio::test]
    async fn caption_failure_degrades_to_fallback() {
        let chat = Arc::new(ScriptedChat::new(&[]));
        let stylist = OutfitStylist::new(Some(chat)).with_shuffle(identity_shuffle());
        let wardrobe = [entry(1, "Jackets"), entry(2, "Pants"), entry(3, "Shoes")];
        let rec = stylist.generate(b"img", "image/png", "", &wardrobe).await;
        assert_covers_roles(&rec.items);
    }

    #[tokio::test]
    async fn well_formed_selection_is_honored_and_sorted() {
        let wardrobe = [
            entry(1, "Shoes"),
            entry(2, "Shirts"),
            entry(3, "Pants"),
            entry(4, "Jackets"),
        ];
        let selection =
            serde_json::to_string(&[&wardrobe[1], &wardrobe[2], &wardrobe[0]]).unwrap();
        let chat = Arc::new(ScriptedChat::new(&["caption", selection.as_str()]));
        let stylist = OutfitStylist::new(Some(chat));
        let rec = stylist.generate(b"img", "image/png", "brunch", &wardrobe).await;

        let ids: Vec<_> = rec.items.iter().filter_map(|i| i.id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(2), Uuid::from_u128(3), Uuid::from_u128(1)]
        );
    }
}
