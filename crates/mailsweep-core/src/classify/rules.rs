//! Layered keyword classifier.
//!
//! Three layers, evaluated in order:
//!
//! 1. **Strong intent patterns** — high-precision phrases in subject or
//!    snippet that decide the category outright, ignoring the sender.
//! 2. **Weighted keyword scoring** — sender-entity keywords carry a low
//!    weight (who the entity is), context keywords in subject/snippet carry
//!    higher weights (what the mail is about).
//! 3. **Conflict resolution** — when the top two scores are close, a small
//!    set of pairwise rules breaks the tie.
//!
//! Mail matching nothing falls back to Promotions (if it smells like a
//! newsletter) or Other.

use crate::classify::Categorizer;
use crate::email::Category;

/// Strong-intent score, an automatic win.
const WEIGHT_STRONG_INTENT: i32 = 100;
/// Low weight for sender-entity matches, so context can override.
const WEIGHT_SENDER_MATCH: i32 = 2;
/// High weight for subject matches.
const WEIGHT_SUBJECT_MATCH: i32 = 5;
/// Medium weight for snippet matches.
const WEIGHT_SNIPPET_MATCH: i32 = 3;
/// Top-two scores within this distance go to conflict resolution.
const CONFLICT_MARGIN: i32 = 3;

const STRONG_INTENT: &[(Category, &[&str])] = &[
    (
        Category::Jobs,
        &[
            "interview schedule",
            "job offer",
            "application received",
            "hiring manager",
            "talent acquisition",
            "your candidature",
            "job application",
            "apply for",
            "referral",
            "position at",
            "offer letter",
            "joining date",
            "employment",
            "careers team",
            "recruiting",
            "shortlisted",
        ],
    ),
    (
        Category::Finance,
        &[
            "one time password",
            "otp is",
            "payment successful",
            "transaction alert",
            "credit card statement",
            "amount due",
            "payment received",
            "money sent",
            "fund transfer",
            "bank statement",
            "account balance",
            "payment scheduled",
            "withdrawal",
            "deposited",
        ],
    ),
    (
        Category::Travel,
        &[
            "pnr",
            "boarding pass",
            "e-ticket",
            "flight confirmation",
            "hotel reservation",
            "booking id",
            "web check-in",
            "trip itinerary",
            "journey details",
        ],
    ),
    (
        Category::Shopping,
        &[
            "order placed",
            "order confirmation",
            "out for delivery",
            "package delivered",
            "shipment tracking",
            "return request",
            "refund processed",
            "invoice for order",
        ],
    ),
    (
        Category::Social,
        &[
            "friend request",
            "started following you",
            "invitation to connect",
            "mentioned you in",
            "commented on",
            "birthday",
        ],
    ),
    (
        Category::Tech,
        &[
            "pull request",
            "merge request",
            "pipeline failed",
            "build passed",
            "security alert",
            "access key",
            "verification code",
            "deployment",
        ],
    ),
];

const SENDER_ENTITY: &[(Category, &[&str])] = &[
    (
        Category::Finance,
        &[
            "bank", "pay", "wallet", "card", "finance", "invest", "mutual", "fund", "stock",
            "insurance", "loan", "tax", "gst", "hdfc", "sbi", "axis", "icici", "kotak", "pnb",
            "bob", "paytm", "phonepe", "razorpay", "gpay", "googlepay", "cred", "zerodha", "groww",
            "upstox", "indmoney", "dhan", "navi",
        ],
    ),
    (
        Category::Jobs,
        &[
            "linkedin",
            "naukri",
            "indeed",
            "glassdoor",
            "instahyre",
            "tophire",
            "wellfound",
            "angelist",
            "workday",
            "lever",
            "greenhouse",
            "foundit",
            "cutshort",
        ],
    ),
    (
        Category::Shopping,
        &[
            "amazon", "flipkart", "myntra", "ajio", "meesho", "nykaa", "swiggy", "zomato",
            "blinkit", "zepto", "bigbasket", "jiomart", "tataneu", "snapdeal",
        ],
    ),
    (
        Category::Travel,
        &[
            "uber",
            "ola",
            "rapido",
            "irctc",
            "makemytrip",
            "goibibo",
            "easemytrip",
            "indigo",
            "airindia",
            "vistara",
            "redbus",
            "ixigo",
            "booking",
            "agoda",
            "airbnb",
        ],
    ),
    (
        Category::Social,
        &[
            "facebook",
            "instagram",
            "twitter",
            "x",
            "pinterest",
            "snapchat",
            "reddit",
            "quora",
            "medium",
            "youtube",
            "twitch",
            "discord",
            "whatsapp",
            "telegram",
        ],
    ),
    (
        Category::Tech,
        &[
            "github",
            "gitlab",
            "bitbucket",
            "jira",
            "atlassian",
            "confluence",
            "trello",
            "slack",
            "notion",
            "figma",
            "canva",
            "google cloud",
            "aws",
            "azure",
            "firebase",
            "vercel",
            "netlify",
            "heroku",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "netflix",
            "prime video",
            "hotstar",
            "disney",
            "spotify",
            "apple music",
            "jiosaavn",
            "gaana",
            "bookmyshow",
            "insider",
        ],
    ),
    (
        Category::Education,
        &[
            "udemy",
            "coursera",
            "edx",
            "pluralsight",
            "codecademy",
            "udacity",
            "skillshare",
            "upgrad",
            "scaler",
            "simplilearn",
            "unacademy",
            "byjus",
        ],
    ),
];

const CONTEXT: &[(Category, &[&str])] = &[
    (
        Category::Finance,
        &[
            "invoice", "bill", "receipt", "premium", "ledger", "itr", "salary", "expense",
            "budget",
        ],
    ),
    (
        Category::Jobs,
        &[
            "career",
            "hiring",
            "resume",
            "cv",
            "opportunity",
            "vacancy",
            "opening",
            "job",
            "recruit",
            "interview",
            "offer",
        ],
    ),
    (
        Category::Shopping,
        &[
            "discount", "sale", "buy", "purchase", "cart", "shop", "store", "deal", "coupon",
            "cashback",
        ],
    ),
    (
        Category::Travel,
        &[
            "ticket", "flight", "train", "bus", "cab", "ride", "driver", "vacation", "tour",
            "stay",
        ],
    ),
    (
        Category::Social,
        &[
            "post",
            "story",
            "status",
            "timeline",
            "feed",
            "message",
            "dm",
            "connection",
            "network",
        ],
    ),
    (
        Category::Tech,
        &[
            "code", "dev", "api", "sdk", "server", "database", "linux", "bug", "issue", "commit",
            "repo",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "movie", "series", "episode", "song", "album", "playlist", "concert", "event",
            "stream", "watch",
        ],
    ),
    (
        Category::Education,
        &[
            "course",
            "class",
            "lecture",
            "tutorial",
            "exam",
            "quiz",
            "assignment",
            "grade",
            "certificate",
            "learning",
        ],
    ),
];

/// The built-in rule-based [`Categorizer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    /// Creates the classifier. Stateless; all tables are compiled in.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Categorizer for RuleClassifier {
    fn classify(&self, sender: &str, subject: &str, snippet: &str) -> Category {
        let sender = sender.to_lowercase();
        let subject = subject.to_lowercase();
        let snippet = snippet.to_lowercase();
        let content = format!("{subject} {snippet}");

        // Layer 1: strong intent overrides everything.
        for (category, patterns) in STRONG_INTENT {
            if patterns.iter().any(|p| content.contains(p)) {
                return *category;
            }
        }

        // Layer 2: weighted scoring. Table order keeps ties deterministic.
        let mut scores: Vec<(Category, i32)> =
            SENDER_ENTITY.iter().map(|(c, _)| (*c, 0)).collect();

        for (category, keywords) in CONTEXT {
            for keyword in *keywords {
                let mut gained = 0;
                if subject.contains(keyword) {
                    gained += WEIGHT_SUBJECT_MATCH;
                }
                if snippet.contains(keyword) {
                    gained += WEIGHT_SNIPPET_MATCH;
                }
                if gained != 0 {
                    bump(&mut scores, *category, gained);
                }
            }
        }

        for (category, keywords) in SENDER_ENTITY {
            for keyword in *keywords {
                if sender.contains(keyword) {
                    bump(&mut scores, *category, WEIGHT_SENDER_MATCH);
                }
            }
        }

        scores.sort_by(|a, b| b.1.cmp(&a.1));
        let (winner, winner_score) = scores[0];

        if winner_score == 0 {
            // Layer 3 fallback.
            if content.contains("unsubscribe") || content.contains("newsletter") {
                return Category::Promotions;
            }
            return Category::Other;
        }

        if let Some(&(runner_up, runner_score)) = scores.get(1)
            && winner_score - runner_score <= CONFLICT_MARGIN
            && runner_score > 0
        {
            return resolve_conflict(winner, runner_up, &content);
        }

        winner
    }
}

fn bump(scores: &mut [(Category, i32)], category: Category, amount: i32) {
    if let Some(entry) = scores.iter_mut().find(|(c, _)| *c == category) {
        entry.1 += amount;
    }
}

/// Breaks ties between two close-scoring categories with pairwise context
/// rules; defaults to the higher-scoring one.
fn resolve_conflict(winner: Category, runner_up: Category, content: &str) -> Category {
    let pair = |a: Category, b: Category| {
        (winner == a && runner_up == b) || (winner == b && runner_up == a)
    };

    // Finance vs Travel (a ride receipt is Finance, the ride itself Travel).
    if pair(Category::Finance, Category::Travel) {
        if content.contains("receipt") || content.contains("invoice") || content.contains("bill") {
            return Category::Finance;
        }
        return Category::Travel;
    }

    // Jobs vs Social (job intent beats generic network updates).
    if pair(Category::Jobs, Category::Social) {
        if content.contains("hiring") || content.contains("apply") || content.contains("job") {
            return Category::Jobs;
        }
        return Category::Social;
    }

    // Shopping vs Tech (orders beat platform noise).
    if pair(Category::Shopping, Category::Tech) {
        if content.contains("order")
            || content.contains("delivery")
            || content.contains("shipment")
        {
            return Category::Shopping;
        }
        return Category::Tech;
    }

    // Finance vs Shopping (card statements beat store offers).
    if pair(Category::Finance, Category::Shopping) {
        if content.contains("credit card")
            || content.contains("statement")
            || content.contains("balance")
        {
            return Category::Finance;
        }
        return Category::Shopping;
    }

    winner
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(sender: &str, subject: &str, snippet: &str) -> Category {
        RuleClassifier::new().classify(sender, subject, snippet)
    }

    #[test]
    fn strong_intent_ignores_sender() {
        assert_eq!(
            classify("noreply@linkedin.com", "Payment successful", ""),
            Category::Finance
        );
        assert_eq!(
            classify("anyone@example.com", "Your boarding pass", ""),
            Category::Travel
        );
    }

    #[test]
    fn subject_context_outweighs_sender_entity() {
        // PayPal-ish sender (2) vs job subject (5): Jobs wins.
        assert_eq!(
            classify("offers@paypal.com", "A new job opportunity for you", ""),
            Category::Jobs
        );
    }

    #[test]
    fn sender_entity_decides_when_no_context() {
        assert_eq!(
            classify("no-reply@spotify.com", "Your week in music", ""),
            Category::Entertainment
        );
    }

    #[test]
    fn newsletter_fallback_goes_to_promotions() {
        assert_eq!(
            classify("hello@startup.io", "Our spring newsletter", ""),
            Category::Promotions
        );
        assert_eq!(classify("someone@example.com", "hi", ""), Category::Other);
    }

    #[test]
    fn finance_travel_conflict_resolves_on_receipt() {
        assert_eq!(
            classify("receipts@uber.com", "Your Tuesday ride receipt", ""),
            Category::Finance
        );
    }

    #[test]
    fn shopping_tech_conflict_resolves_on_order() {
        // Tech sender, shopping subject, close scores: "order" breaks the tie.
        assert_eq!(
            classify("noreply@github.com", "Your order from the marketplace store", ""),
            Category::Shopping
        );
    }
}
