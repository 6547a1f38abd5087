use log::warn;
use rand::Rng;

const ADJECTIVES: [&str; 90] = [
	"amber", "ancient", "arctic", "autumn", "azure", "blazing", "bold", "bright", "bronze", "calm",
	"cedar", "celest", "chrome", "cipher", "cobalt", "coral", "cosmic", "crimson", "crystal",
	"daring", "dawn", "deep", "delta", "distant", "dusk", "echo", "elder", "ember", "fading",
	"fierce", "flint", "frozen", "gentle", "gilded", "golden", "granite", "hollow", "hushed",
	"iron", "ivory", "jade", "keen", "kindled", "lapis", "lemon", "light", "lunar", "marble",
	"mellow", "misty", "mossy", "noble", "north", "obsid", "onyx", "opal", "pale", "pearl", "pine",
	"polished", "prism", "quiet", "rapid", "regal", "rising", "rowan", "ruby", "rustic", "sage",
	"scarlet", "shadow", "sharp", "silent", "silver", "slate", "solar", "steady", "still", "storm",
	"sunlit", "swift", "tidal", "timber", "verdant", "violet", "vivid", "warm", "woven", "zenith",
	"zephyr",
];

const NOUNS: [&str; 95] = [
	"anchor", "arrow", "atlas", "beacon", "birch", "blade", "bloom", "bridge", "brook", "canyon",
	"cedar", "cliff", "cloud", "comet", "compass", "condor", "coral", "crane", "creek", "crest",
	"delta", "drift", "dune", "eagle", "ember", "falcon", "fern", "finch", "flame", "flint",
	"forge", "frost", "garden", "gate", "glacier", "grove", "harbor", "hawk", "hearth", "heron",
	"hollow", "horizon", "isle", "jasper", "kindle", "lake", "lantern", "lark", "laurel", "leaf",
	"ledge", "linden", "lotus", "maple", "meadow", "mesa", "meteor", "moss", "narrows", "nebula",
	"nexus", "oak", "orbit", "osprey", "otter", "peak", "pebble", "phoenix", "pine", "plover",
	"pond", "prism", "quartz", "raven", "reef", "ridge", "river", "sage", "shore", "sparrow",
	"spire", "spring", "stone", "summit", "swift", "thistle", "thorn", "tide", "tower", "trail",
	"vale", "valley", "vessel", "vine", "willow",
];

// Number of distinct `adjective-noun` pairs.
pub const ALIAS_SPACE: usize = ADJECTIVES.len() * NOUNS.len();

// Draw `adjective-noun` pairs until one is not taken, giving up after
// ALIAS_SPACE attempts.
// Once the attempts are spent the alias gets a `-NNN` suffix (0..1000) and
// is returned without checking `is_taken` again, so uniqueness is
// best-effort on that path only.
pub fn generate_alias_with<R, F>(rng: &mut R, is_taken: F) -> String
where
	R: Rng + ?Sized,
	F: Fn(&str) -> bool,
{
	for _ in 0..ALIAS_SPACE {
		let alias = draw_pair(rng);
		if !is_taken(&alias) {
			return alias;
		}
	}

	// TODO: re-check the suffixed alias against `is_taken` once callers can
	// handle a generator that may fail outright.
	let alias = format!("{}-{}", draw_pair(rng), rng.gen_range(0..1000));
	warn!("Alias space exhausted, falling back to suffixed alias {}", alias);
	alias
}

fn draw_pair<R: Rng + ?Sized>(rng: &mut R) -> String {
	let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
	let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
	format!("{}-{}", adjective, noun)
}
