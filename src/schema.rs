//! The catalog of Hyprland parameters this crate knows how to validate.
//!
//! Built once from a static table when a service starts. Per-type validation
//! and formatting live in [`validate`](crate::validate); this module only owns
//! the definitions and lookups.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Str,
    Int,
    Float,
    Bool,
    Color,
    Gradient,
    Vec2,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Str => "str",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::Color => "color",
            ParamType::Gradient => "gradient",
            ParamType::Vec2 => "vec2",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ParamType::Int | ParamType::Float)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single known parameter. Identity is `full_path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub section: String,
    pub name: String,
    pub full_path: String,
    pub param_type: ParamType,
    pub default_value: String,
    pub description: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub options: Option<Vec<String>>,
    pub popularity: u8,
}

impl Parameter {
    pub fn new(full_path: &str, param_type: ParamType, default_value: &str) -> Self {
        let (section, name) = match full_path.rsplit_once(':') {
            Some((s, n)) => (s.to_string(), n.to_string()),
            None => (String::new(), full_path.to_string()),
        };
        Self {
            section,
            name,
            full_path: full_path.to_string(),
            param_type,
            default_value: default_value.to_string(),
            description: String::new(),
            min: None,
            max: None,
            options: None,
            popularity: 0,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }

    pub fn with_popularity(mut self, popularity: u8) -> Self {
        self.popularity = popularity;
        self
    }
}

/// Static row of the built-in catalog.
#[derive(Debug, Clone, Copy)]
struct ParamDef {
    path: &'static str,
    ty: ParamType,
    default: &'static str,
    popularity: u8,
    description: &'static str,
    min: Option<f64>,
    max: Option<f64>,
    options: Option<&'static [&'static str]>,
}

impl ParamDef {
    const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    const fn options(mut self, options: &'static [&'static str]) -> Self {
        self.options = Some(options);
        self
    }

    fn build(&self) -> Parameter {
        let param = Parameter::new(self.path, self.ty, self.default)
            .with_description(self.description)
            .with_range(self.min, self.max)
            .with_popularity(self.popularity);
        match self.options {
            Some(opts) => param.with_options(opts),
            None => param,
        }
    }
}

const fn def(
    path: &'static str,
    ty: ParamType,
    default: &'static str,
    popularity: u8,
    description: &'static str,
) -> ParamDef {
    ParamDef {
        path,
        ty,
        default,
        popularity,
        description,
        min: None,
        max: None,
        options: None,
    }
}

use ParamType::{Bool, Color, Float, Gradient, Int, Str, Vec2};

#[rustfmt::skip]
static BUILTIN: &[ParamDef] = &[
    // general
    def("general:border_size", Int, "1", 95, "Size of the border around windows").min(0.0),
    def("general:gaps_in", Int, "5", 100, "Gaps between windows").min(0.0),
    def("general:gaps_out", Int, "20", 100, "Gaps between windows and monitor edges").min(0.0),
    def("general:gaps_workspaces", Int, "0", 30, "Gaps between workspaces when switching").min(0.0),
    def("general:col.active_border", Gradient, "0xffffffff", 98, "Border color for the active window"),
    def("general:col.inactive_border", Gradient, "0xff444444", 90, "Border color for inactive windows"),
    def("general:col.nogroup_border", Gradient, "0xffffaaff", 20, "Inactive border color for windows that cannot be added to a group"),
    def("general:col.nogroup_border_active", Gradient, "0xffff00ff", 20, "Active border color for windows that cannot be added to a group"),
    def("general:layout", Str, "dwindle", 80, "Which layout to use").options(&["dwindle", "master"]),
    def("general:resize_on_border", Bool, "false", 60, "Resize windows by dragging their border or gaps"),
    def("general:extend_border_grab_area", Int, "15", 30, "Extends the area around the border where you can click to resize").min(0.0),
    def("general:hover_icon_on_border", Bool, "true", 25, "Show a cursor icon when hovering over borders"),
    def("general:allow_tearing", Bool, "false", 35, "Master switch for allowing tearing"),
    def("general:no_border_on_floating", Bool, "false", 25, "Disable borders for floating windows"),
    def("general:snap:enabled", Bool, "false", 30, "Enable snapping for floating windows"),

    // decoration
    def("decoration:rounding", Int, "0", 97, "Rounded corners' radius in layout pixels").min(0.0),
    def("decoration:rounding_power", Float, "2.0", 40, "Curve used for rounding corners").range(2.0, 10.0),
    def("decoration:active_opacity", Float, "1.0", 85, "Opacity of active windows").range(0.0, 1.0),
    def("decoration:inactive_opacity", Float, "1.0", 85, "Opacity of inactive windows").range(0.0, 1.0),
    def("decoration:fullscreen_opacity", Float, "1.0", 40, "Opacity of fullscreen windows").range(0.0, 1.0),
    def("decoration:dim_inactive", Bool, "false", 45, "Dim inactive windows"),
    def("decoration:dim_strength", Float, "0.5", 40, "How much inactive windows are dimmed").range(0.0, 1.0),
    def("decoration:dim_special", Float, "0.2", 25, "How much to dim the rest of the screen when a special workspace is open").range(0.0, 1.0),

    // decoration:blur
    def("decoration:blur:enabled", Bool, "true", 92, "Enable kawase window background blur"),
    def("decoration:blur:size", Int, "8", 90, "Blur size (distance)").min(1.0),
    def("decoration:blur:passes", Int, "1", 88, "The amount of passes to perform").range(1.0, 10.0),
    def("decoration:blur:ignore_opacity", Bool, "true", 50, "Make the blur layer ignore the opacity of the window"),
    def("decoration:blur:new_optimizations", Bool, "true", 55, "Enable further optimizations to the blur"),
    def("decoration:blur:xray", Bool, "false", 50, "Floating windows ignore tiled windows in their blur"),
    def("decoration:blur:noise", Float, "0.0117", 35, "How much noise to apply").range(0.0, 1.0),
    def("decoration:blur:contrast", Float, "0.8916", 35, "Contrast modulation for blur").range(0.0, 2.0),
    def("decoration:blur:brightness", Float, "0.8172", 35, "Brightness modulation for blur").range(0.0, 2.0),
    def("decoration:blur:vibrancy", Float, "0.1696", 35, "Increase saturation of blurred colors").range(0.0, 1.0),
    def("decoration:blur:popups", Bool, "false", 30, "Whether to blur popups"),

    // decoration:shadow
    def("decoration:shadow:enabled", Bool, "true", 80, "Enable drop shadows on windows"),
    def("decoration:shadow:range", Int, "4", 70, "Shadow range (size) in layout px").min(0.0),
    def("decoration:shadow:render_power", Int, "3", 55, "In what power to render the falloff").range(1.0, 4.0),
    def("decoration:shadow:color", Color, "0xee1a1a1a", 70, "Shadow's color"),
    def("decoration:shadow:color_inactive", Color, "", 40, "Inactive shadow color; falls back to the active one when unset"),
    def("decoration:shadow:offset", Vec2, "0 0", 45, "Shadow's rendering offset"),
    def("decoration:shadow:scale", Float, "1.0", 35, "Shadow's scale").range(0.0, 1.0),

    // animations
    def("animations:enabled", Bool, "true", 93, "Enable animations"),
    def("animations:first_launch_animation", Bool, "true", 25, "Enable the first launch animation"),

    // input
    def("input:kb_layout", Str, "us", 90, "Keyboard layouts"),
    def("input:kb_variant", Str, "", 50, "Keyboard layout variants"),
    def("input:kb_options", Str, "", 55, "Keyboard options such as caps:escape"),
    def("input:follow_mouse", Int, "1", 70, "How cursor movement affects window focus").options(&["0", "1", "2", "3"]),
    def("input:sensitivity", Float, "0.0", 75, "Mouse input sensitivity").range(-1.0, 1.0),
    def("input:natural_scroll", Bool, "false", 65, "Invert scrolling direction"),
    def("input:repeat_rate", Int, "25", 45, "Repeat rate for held-down keys, in repeats per second").min(0.0),
    def("input:repeat_delay", Int, "600", 45, "Delay before a held-down key is repeated, in milliseconds").min(0.0),
    def("input:touchpad:natural_scroll", Bool, "false", 70, "Invert scrolling direction on touchpads"),
    def("input:touchpad:disable_while_typing", Bool, "true", 50, "Disable the touchpad while typing"),
    def("input:touchpad:tap-to-click", Bool, "true", 55, "Tapping on the touchpad with 1, 2, or 3 fingers sends a click"),

    // gestures
    def("gestures:workspace_swipe", Bool, "false", 60, "Enable workspace swipe gesture on touchpad"),
    def("gestures:workspace_swipe_fingers", Int, "3", 45, "How many fingers for the touchpad gesture").min(2.0),

    // group
    def("group:col.border_active", Gradient, "0x66ffff00", 35, "Active group border color"),
    def("group:col.border_inactive", Gradient, "0x66777700", 30, "Inactive group border color"),

    // misc
    def("misc:disable_hyprland_logo", Bool, "false", 85, "Disable the random Hyprland logo and anime girl background"),
    def("misc:disable_splash_rendering", Bool, "false", 75, "Disable the Hyprland splash rendering"),
    def("misc:force_default_wallpaper", Int, "-1", 60, "Enforce a default wallpaper variant").range(-1.0, 2.0).options(&["-1", "0", "1", "2"]),
    def("misc:vfr", Bool, "true", 40, "Lower the amount of sent frames when nothing is happening on-screen"),
    def("misc:vrr", Int, "0", 40, "Adaptive sync of your monitor").options(&["0", "1", "2", "3"]),
    def("misc:mouse_move_enables_dpms", Bool, "false", 30, "Moving the mouse turns on the monitor if DPMS is off"),
    def("misc:key_press_enables_dpms", Bool, "false", 30, "Pressing a key turns on the monitor if DPMS is off"),
    def("misc:background_color", Color, "0x111111", 30, "Background color when no wallpaper is set"),
    def("misc:middle_click_paste", Bool, "true", 30, "Enable middle-click paste"),
    def("misc:focus_on_activate", Bool, "false", 35, "Focus an app that requests to be focused"),

    // binds / xwayland / render / cursor / ecosystem
    def("binds:workspace_back_and_forth", Bool, "false", 40, "Switching to the current workspace switches to the previous one"),
    def("binds:allow_workspace_cycles", Bool, "false", 25, "Previous workspace remembers the one before it as well"),
    def("xwayland:force_zero_scaling", Bool, "false", 45, "Unscale XWayland windows"),
    def("render:direct_scanout", Bool, "false", 35, "Enable direct scanout for fullscreen windows"),
    def("render:explicit_sync", Int, "2", 30, "Whether to enable explicit sync support").options(&["0", "1", "2"]),
    def("render:cm_enabled", Bool, "true", 20, "Whether the color management pipeline is enabled"),
    def("cursor:no_hardware_cursors", Int, "2", 50, "Disable hardware cursors").options(&["0", "1", "2"]),
    def("cursor:inactive_timeout", Float, "0", 45, "Hide the cursor after this many seconds of inactivity").min(0.0),
    def("cursor:no_warps", Bool, "false", 35, "Do not warp the cursor in certain situations"),
    def("cursor:hide_on_key_press", Bool, "false", 35, "Hide the cursor when you press any key"),
    def("cursor:hide_on_touch", Bool, "true", 20, "Hide the cursor when the last input was a touch input"),
    def("cursor:enable_hyprcursor", Bool, "true", 25, "Whether to enable hyprcursor support"),
    def("ecosystem:no_update_news", Bool, "false", 30, "Disable the popup shown after updating"),

    // layouts
    def("dwindle:pseudotile", Bool, "false", 60, "Enable pseudotiling"),
    def("dwindle:preserve_split", Bool, "false", 60, "The split (side/top) will not change regardless of container size"),
    def("dwindle:smart_split", Bool, "false", 35, "Split direction follows the cursor position"),
    def("dwindle:force_split", Int, "0", 35, "Which side new windows split to").options(&["0", "1", "2"]),
    def("master:new_status", Str, "slave", 45, "Where new windows go in the master layout").options(&["master", "slave", "inherit"]),
    def("master:mfact", Float, "0.55", 45, "Percentage of the master area").range(0.0, 1.0),
    def("master:orientation", Str, "left", 35, "Default placement of the master area").options(&["left", "right", "top", "bottom", "center"]),
];

/// The set of known parameters, indexed by full path.
#[derive(Debug, Clone)]
pub struct Catalog {
    params: Vec<Parameter>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// The built-in Hyprland catalog.
    pub fn builtin() -> Self {
        Self::from_parameters(BUILTIN.iter().map(ParamDef::build).collect())
    }

    /// Build a catalog from explicit definitions. Later duplicates replace earlier ones.
    pub fn from_parameters(params: Vec<Parameter>) -> Self {
        let mut deduped: Vec<Parameter> = Vec::with_capacity(params.len());
        let mut index = HashMap::new();
        for param in params {
            match index.get(&param.full_path) {
                Some(&i) => deduped[i] = param,
                None => {
                    index.insert(param.full_path.clone(), deduped.len());
                    deduped.push(param);
                }
            }
        }
        Self {
            params: deduped,
            index,
        }
    }

    pub fn get(&self, path: &str) -> Option<&Parameter> {
        self.index.get(path).map(|&i| &self.params[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Distinct section paths, sorted. Root-level parameters are not a section.
    pub fn sections(&self) -> BTreeSet<&str> {
        self.params
            .iter()
            .filter(|p| !p.section.is_empty())
            .map(|p| p.section.as_str())
            .collect()
    }

    /// Parameters whose section is exactly `section`.
    pub fn in_section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a Parameter> {
        self.params.iter().filter(move |p| p.section == section)
    }

    /// The `limit` most popular parameters, ties broken by path.
    pub fn most_popular(&self, limit: usize) -> Vec<&Parameter> {
        let mut sorted: Vec<&Parameter> = self.params.iter().collect();
        sorted.sort_by(|a, b| {
            b.popularity
                .cmp(&a.popularity)
                .then_with(|| a.full_path.cmp(&b.full_path))
        });
        sorted.truncate(limit);
        sorted
    }

    /// Case-insensitive substring search over path and description.
    pub fn search(&self, query: &str) -> Vec<&Parameter> {
        let needle = query.to_lowercase();
        self.params
            .iter()
            .filter(|p| {
                p.full_path.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
