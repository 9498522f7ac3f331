use crate::model::intent::CommandDomain;

// ---------------------------------------------------------------------------
// Domain vocabularies
// ---------------------------------------------------------------------------

const DRAWING_KEYWORDS: &[&str] = &[
    "draw", "sketch", "paint", "brush", "pen", "pencil", "line", "shape", "circle",
    "rectangle", "square", "triangle", "canvas", "erase", "stroke",
];

const STYLING_KEYWORDS: &[&str] = &[
    "color", "colour", "style", "font", "theme", "background", "border", "primary",
    "secondary", "palette", "bold", "italic", "shadow", "spacing", "typography",
];

const ANIMATION_KEYWORDS: &[&str] = &[
    "animate", "animation", "fade", "move", "slide", "bounce", "spin", "rotate",
    "transition", "keyframe", "duration", "timeline", "ease", "zoom", "pulse",
];

const WEBSITE_KEYWORDS: &[&str] = &[
    "page", "website", "site", "layout", "header", "footer", "navbar", "button", "section",
    "component", "menu", "link", "form", "hero", "grid",
];

const GENERAL_KEYWORDS: &[&str] = &[
    "create", "make", "show", "help", "open", "save", "undo", "redo", "delete", "new", "add",
    "remove",
];

pub fn domain_keywords(domain: CommandDomain) -> &'static [&'static str] {
    match domain {
        CommandDomain::Drawing => DRAWING_KEYWORDS,
        CommandDomain::Styling => STYLING_KEYWORDS,
        CommandDomain::Animation => ANIMATION_KEYWORDS,
        CommandDomain::Website => WEBSITE_KEYWORDS,
        CommandDomain::General => GENERAL_KEYWORDS,
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Keyword hit counts per domain, in `CommandDomain::ALL` order.
///
/// A keyword counts once if it occurs anywhere in the lowercased text,
/// including inside longer words.
pub fn domain_scores(text: &str) -> Vec<(CommandDomain, usize)> {
    let lowered = text.to_lowercase();
    CommandDomain::ALL
        .into_iter()
        .map(|domain| {
            let hits = domain_keywords(domain)
                .iter()
                .filter(|kw| lowered.contains(*kw))
                .count();
            (domain, hits)
        })
        .collect()
}

/// Pick the domain a command most likely targets.
///
/// The highest keyword count wins. When nothing matched, or when the winner is
/// only tied with `general`, the best-scoring specific domain is returned
/// instead so generic verbs like "create" never drown out a specific match.
pub fn classify_command(text: &str) -> CommandDomain {
    let mut ranked = domain_scores(text);
    // Stable: equal counts keep `CommandDomain::ALL` order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let (top_domain, top_score) = ranked[0];
    let second = ranked.get(1).copied();

    let tied_with_general = matches!(
        second,
        Some((CommandDomain::General, score)) if score == top_score
    );

    if top_score == 0 || tied_with_general {
        return ranked
            .iter()
            .find(|(domain, score)| *domain != CommandDomain::General && *score > 0)
            .map(|(domain, _)| *domain)
            .unwrap_or(CommandDomain::General);
    }

    top_domain
}
