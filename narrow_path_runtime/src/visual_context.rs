//! Visual context — turns game state into an image-generation prompt.
//!
//! Rule-based and deterministic: thresholds on the three axes pick
//! weather, time of day, mood and scene dressing, which fill the slots
//! of a prompt template. The caller supplies anything random (the
//! number of characters in frame).

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use narrow_path_engine::arithmetic::SCALE;
use narrow_path_engine::domain::RiskState;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

// ── Scene context ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Dawn,
    Day,
    Dusk,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Cloudy,
    Stormy,
    Foggy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Atmosphere {
    Tense,
    Hopeful,
    Ominous,
    Uncertain,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Day => "day",
            TimeOfDay::Dusk => "dusk",
            TimeOfDay::Night => "night",
        }
    }
}

impl Weather {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Cloudy => "cloudy",
            Weather::Stormy => "stormy",
            Weather::Foggy => "foggy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub location: String,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
    pub atmosphere: Atmosphere,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subjects {
    pub primary_focus: String,
    pub characters: Vec<String>,
    pub technology: Vec<String>,
}

/// Percentages, 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mood {
    pub tension: i64,
    pub hope: i64,
    pub urgency: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneContext {
    pub setting: Setting,
    pub subjects: Subjects,
    pub mood: Mood,
}

fn rounded_percent(units: i64) -> i64 {
    (units * 100 + SCALE / 2) / SCALE
}

/// Distance of the path from its centre, scaled so either edge is SCALE.
fn path_urgency_units(state: &RiskState) -> i64 {
    (state.path_position - SCALE / 2).abs() * 2
}

pub fn generate_scene_context(state: &RiskState, scenario_id: &str) -> SceneContext {
    let chaos = state.doom;
    let control = state.dystopia;
    let tension_units = chaos.max(control);
    let hope_units = SCALE - tension_units;

    let weather = if tension_units > 7000 {
        Weather::Stormy
    } else if tension_units > 4000 {
        Weather::Cloudy
    } else if hope_units > 6000 {
        Weather::Clear
    } else {
        Weather::Foggy
    };

    let time_of_day = if control > 7000 {
        TimeOfDay::Night
    } else if chaos > 7000 {
        TimeOfDay::Dusk
    } else if hope_units > 6000 {
        TimeOfDay::Dawn
    } else {
        TimeOfDay::Day
    };

    let atmosphere = if tension_units > 7000 {
        Atmosphere::Ominous
    } else if tension_units > 4000 {
        Atmosphere::Tense
    } else if hope_units > 6000 {
        Atmosphere::Hopeful
    } else {
        Atmosphere::Uncertain
    };

    let tension = rounded_percent(tension_units);
    SceneContext {
        setting: Setting {
            location: scenario_location(scenario_id).to_string(),
            time_of_day,
            weather,
            atmosphere,
        },
        subjects: Subjects {
            primary_focus: scenario_focus(scenario_id).to_string(),
            characters: scenario_characters(scenario_id, chaos, control),
            technology: technology_elements(scenario_id, chaos, control),
        },
        mood: Mood {
            tension,
            hope: 100 - tension,
            urgency: rounded_percent(path_urgency_units(state)),
        },
    }
}

fn scenario_location(scenario_id: &str) -> &'static str {
    match scenario_id {
        "ai-summit" => "United Nations headquarters conference room",
        "tech-startup" => "Modern Silicon Valley office space",
        "government-meeting" => "Government situation room",
        "research-lab" => "High-tech AI research laboratory",
        "public-forum" => "Modern auditorium with public audience",
        _ => "Modern meeting space",
    }
}

fn scenario_focus(scenario_id: &str) -> &'static str {
    match scenario_id {
        "ai-summit" => "International diplomats in discussion",
        "tech-startup" => "Developers at workstations",
        "government-meeting" => "Policy makers reviewing documents",
        "research-lab" => "Scientists examining AI systems",
        "public-forum" => "Speaker addressing concerned audience",
        _ => "People in professional meeting",
    }
}

fn scenario_characters(scenario_id: &str, chaos: i64, control: i64) -> Vec<String> {
    let base: &[&str] = match scenario_id {
        "ai-summit" => &["world leaders", "diplomats", "advisors"],
        "tech-startup" => &["software engineers", "product managers", "executives"],
        "government-meeting" => &["policy makers", "military advisors", "intelligence officials"],
        "research-lab" => &["AI researchers", "data scientists", "lab technicians"],
        "public-forum" => &["speakers", "audience members", "moderators"],
        _ => &["professionals"],
    };
    let mut characters: Vec<String> = base.iter().map(|s| s.to_string()).collect();
    if control > 6000 {
        characters.extend(["security personnel", "monitors"].map(String::from));
    }
    if chaos > 6000 {
        characters.extend(["concerned individuals", "protesters visible outside"].map(String::from));
    }
    characters
}

fn technology_elements(scenario_id: &str, chaos: i64, control: i64) -> Vec<String> {
    let base: &[&str] = match scenario_id {
        "ai-summit" => &["large displays", "conference systems", "translation devices"],
        "tech-startup" => &[
            "multiple monitors",
            "development workstations",
            "neural network visualizations",
        ],
        "government-meeting" => &[
            "secure communication systems",
            "classified displays",
            "situation monitors",
        ],
        "research-lab" => &["AI training rigs", "data visualization screens", "robotic systems"],
        "public-forum" => &["projection systems", "broadcast equipment", "social media feeds"],
        _ => &["modern displays", "communication systems"],
    };
    let mut tech: Vec<String> = base.iter().map(|s| s.to_string()).collect();
    if chaos > 5000 {
        tech.extend(["error messages", "system glitches", "warning indicators"].map(String::from));
    }
    if control > 5000 {
        tech.extend(
            ["surveillance cameras", "monitoring systems", "biometric scanners"].map(String::from),
        );
    }
    tech
}

// ── Game-state visuals ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrowdBehavior {
    Calm,
    Anxious,
    Panicked,
    Chaotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchitecturalStyle {
    Open,
    Imposing,
    FortressLike,
    Panopticon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Balance {
    ChaosLeaning,
    Centered,
    ControlLeaning,
}

/// Scene dressing driven by each axis. Levels are percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStateVisuals {
    pub chaos_level: i64,
    pub tech_glitches: bool,
    pub crowd_behavior: CrowdBehavior,
    pub environmental_decay: i64,
    pub surveillance_level: i64,
    pub control_symbols: bool,
    pub uniformity: i64,
    pub architectural_style: ArchitecturalStyle,
    pub balance: Balance,
    pub visual_metaphor: String,
    pub proximity_to_danger: i64,
}

pub fn game_state_visuals(state: &RiskState) -> GameStateVisuals {
    let chaos_level = rounded_percent(state.doom);
    let surveillance_level = rounded_percent(state.dystopia);
    let offset = state.path_position - SCALE / 2;

    let crowd_behavior = match chaos_level {
        l if l >= 75 => CrowdBehavior::Chaotic,
        l if l >= 50 => CrowdBehavior::Panicked,
        l if l >= 25 => CrowdBehavior::Anxious,
        _ => CrowdBehavior::Calm,
    };
    let architectural_style = match surveillance_level {
        l if l >= 75 => ArchitecturalStyle::Panopticon,
        l if l >= 50 => ArchitecturalStyle::FortressLike,
        l if l >= 25 => ArchitecturalStyle::Imposing,
        _ => ArchitecturalStyle::Open,
    };
    let (balance, visual_metaphor) = if offset <= -1000 {
        (Balance::ChaosLeaning, "leaning out over a crumbling ledge")
    } else if offset >= 1000 {
        (Balance::ControlLeaning, "pressed against a rising wall")
    } else {
        (Balance::Centered, "walking a tightrope")
    };

    GameStateVisuals {
        chaos_level,
        tech_glitches: state.doom > 5000,
        crowd_behavior,
        environmental_decay: chaos_level,
        surveillance_level,
        control_symbols: state.dystopia > 5000,
        uniformity: surveillance_level,
        architectural_style,
        balance,
        visual_metaphor: visual_metaphor.to_string(),
        proximity_to_danger: rounded_percent(path_urgency_units(state)),
    }
}

// ── Prompt templates ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    Scenario,
    Background,
    Character,
    UiElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    pub category: TemplateCategory,
    pub base_prompt: String,
    pub style_modifiers: Vec<String>,
    pub quality_tags: Vec<String>,
    /// Ordered `(slot, text)` pairs; `{placeholder}`s in the text are filled.
    pub context_slots: Vec<(String, String)>,
    pub negative_prompts: Vec<String>,
    pub dimensions: Dimensions,
    pub mobile_optimized: bool,
    pub compression_level: CompressionLevel,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn slots(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl PromptTemplate {
    pub fn ai_summit() -> Self {
        Self {
            id: "ai-summit-2025".to_string(),
            name: "AI Safety Summit".to_string(),
            category: TemplateCategory::Scenario,
            base_prompt: "World leaders gathered around a futuristic conference table, discussing AI governance in a sleek, modern conference room".to_string(),
            style_modifiers: strings(&[
                "elegant apocalypse aesthetic",
                "dramatic lighting with deep blues and subtle amber accents",
                "sophisticated, professional atmosphere",
                "subtle tension in body language",
            ]),
            quality_tags: strings(&["8k resolution", "photorealistic", "professional photography"]),
            context_slots: slots(&[
                ("mood", "{tension_level} atmosphere"),
                ("setting", "in {time_of_day} with {weather} visible through large windows"),
                ("characters", "featuring {character_count} diverse world leaders"),
                ("chaos_level", "with {chaos_indicators} visible in background screens"),
                ("control_level", "and {surveillance_elements} suggesting monitoring"),
            ]),
            negative_prompts: strings(&[
                "cartoon",
                "anime",
                "low quality",
                "blurry",
                "distorted faces",
                "inappropriate content",
                "violence",
                "explicit imagery",
            ]),
            dimensions: Dimensions {
                width: 1792,
                height: 1024,
                aspect_ratio: "16:9".to_string(),
            },
            mobile_optimized: true,
            compression_level: CompressionLevel::Medium,
        }
    }

    pub fn tech_startup() -> Self {
        Self {
            id: "tech-startup-scene".to_string(),
            name: "Tech Startup Decision".to_string(),
            category: TemplateCategory::Scenario,
            base_prompt: "Modern tech startup office with developers working on AI systems, multiple monitors showing code and neural networks".to_string(),
            style_modifiers: strings(&[
                "elegant apocalypse color scheme",
                "soft blue glow from screens",
                "minimalist modern office design",
                "subtle signs of pressure and intensity",
            ]),
            quality_tags: strings(&["high detail", "realistic lighting", "modern architecture"]),
            context_slots: slots(&[
                ("mood", "conveying {tension_level} energy"),
                ("chaos_level", "with {error_messages} visible on some screens"),
                ("control_level", "and {monitoring_software} interfaces displayed"),
                ("atmosphere", "{uncertainty_level} about the future"),
            ]),
            negative_prompts: strings(&["cluttered", "messy", "outdated technology", "poor lighting"]),
            dimensions: Dimensions {
                width: 1024,
                height: 1024,
                aspect_ratio: "1:1".to_string(),
            },
            mobile_optimized: true,
            compression_level: CompressionLevel::High,
        }
    }

    pub fn negative_prompt(&self) -> String {
        self.negative_prompts.join(", ")
    }
}

/// Value of one `{placeholder}`. Unknown names resolve to themselves.
fn resolve_placeholder(
    name: &str,
    context: &SceneContext,
    visuals: &GameStateVisuals,
    character_count: u32,
) -> String {
    let tension = context.mood.tension;
    let urgency = context.mood.urgency;
    match name {
        "tension_level" => match tension {
            t if t > 70 => "high-tension",
            t if t > 40 => "moderate-tension",
            _ => "calm",
        }
        .to_string(),
        "time_of_day" => context.setting.time_of_day.as_str().to_string(),
        "weather" => context.setting.weather.as_str().to_string(),
        "character_count" => character_count.to_string(),
        "chaos_indicators" => if visuals.chaos_level > 50 {
            "system alerts and error messages"
        } else {
            "stable system displays"
        }
        .to_string(),
        "surveillance_elements" => if visuals.surveillance_level > 50 {
            "security cameras and monitoring interfaces"
        } else {
            "standard office equipment"
        }
        .to_string(),
        "error_messages" => if visuals.tech_glitches {
            "cascading error messages"
        } else {
            "clean build logs"
        }
        .to_string(),
        "monitoring_software" => if visuals.control_symbols {
            "employee monitoring software"
        } else {
            "standard project dashboards"
        }
        .to_string(),
        "uncertainty_level" => match urgency {
            u if u > 70 => "high uncertainty",
            u if u > 40 => "moderate concern",
            _ => "cautious optimism",
        }
        .to_string(),
        other => other.to_string(),
    }
}

/// Fill a template into the final prompt:
/// `base, slot, slot, ... . Style: ... . Quality: ...`
pub fn build_prompt(
    template: &PromptTemplate,
    context: &SceneContext,
    visuals: &GameStateVisuals,
    character_count: u32,
) -> String {
    let mut prompt = template.base_prompt.clone();
    for (_, slot_text) in &template.context_slots {
        let filled = PLACEHOLDER.replace_all(slot_text, |caps: &Captures| {
            resolve_placeholder(&caps[1], context, visuals, character_count)
        });
        prompt.push_str(", ");
        prompt.push_str(&filled);
    }
    prompt.push_str(". Style: ");
    prompt.push_str(&template.style_modifiers.join(", "));
    prompt.push_str(". Quality: ");
    prompt.push_str(&template.quality_tags.join(", "));
    prompt
}

/// Scene context, visuals and prompt in one call.
pub fn prompt_for_state(
    state: &RiskState,
    scenario_id: &str,
    template: &PromptTemplate,
    character_count: u32,
) -> String {
    let context = generate_scene_context(state, scenario_id);
    let visuals = game_state_visuals(state);
    build_prompt(template, &context, &visuals, character_count)
}
