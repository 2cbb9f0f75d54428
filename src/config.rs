use anyhow::{Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::Deserialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::decode::Decoder;
use crate::error::RetroviewError;
use crate::filter::FilterConfig;
use crate::smoothing::DEFAULT_MAX_RADIUS;
use crate::timeline::TimelineConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
    pub format: String,
    #[serde(default = "default_mouse_radius")]
    pub mouse_radius: f32,
}

fn default_mouse_radius() -> f32 {
    DEFAULT_MAX_RADIUS
}

#[derive(Debug, Clone, Deserialize)]
pub struct Inputs {
    /// Logical inputs shown on the timeline, top to bottom.
    pub tracked: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub meta: Meta,
    pub source: SourceSection,
    pub inputs: Inputs,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

impl Profile {
    pub fn parse(txt: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(txt)?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        Self::parse(&txt).map_err(|e| anyhow!("failed to parse {}: {e}", path.display()))
    }

    pub fn decoder(&self) -> crate::error::Result<Decoder> {
        Decoder::from_name(&self.source.format)
    }
}

pub fn validate_profile(p: &Profile) -> crate::error::Result<()> {
    let invalid = |msg: String| -> crate::error::Result<()> { Err(RetroviewError::InvalidProfile(msg)) };

    p.decoder()?;
    if p.inputs.tracked.is_empty() {
        return invalid("inputs.tracked must name at least one input".into());
    }
    if let Some(k) = p.inputs.tracked.iter().find(|k| k.trim().is_empty()) {
        return invalid(format!("empty tracked input name '{k}'"));
    }

    let f = &p.filter;
    if !(0.0..=1.0).contains(&f.mass_ratio) {
        return invalid("filter.mass_ratio must be within 0..=1".into());
    }
    for (key, v) in [
        ("analog_jump", f.analog_jump),
        ("analog_still", f.analog_still),
        ("analog_active", f.analog_active),
    ] {
        if !(v >= 0.0) {
            return invalid(format!("filter.{key} must be non-negative"));
        }
    }

    let t = &p.timeline;
    if !(t.pixels_per_ms > 0.0) {
        return invalid("timeline.pixels_per_ms must be positive".into());
    }
    if t.max_length == 0 {
        return invalid("timeline.max_length must be positive".into());
    }
    if !(p.source.mouse_radius > 0.0) {
        return invalid("source.mouse_radius must be positive".into());
    }
    Ok(())
}

/// Profiles on disk under `~/.config/retroview`, plus the active one.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    pub active_name: String,
    pub profile: Profile,
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("no home directory"))?;
    Ok(dirs.home_dir().join(".config").join("retroview"))
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl ProfileStore {
    pub fn load_or_install_default() -> Result<Self> {
        Self::open(config_dir()?)
    }

    /// Same as [`load_or_install_default`](Self::load_or_install_default)
    /// rooted at `cfgdir`.
    pub fn open(cfgdir: PathBuf) -> Result<Self> {
        let profdir = cfgdir.join("profiles");
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = cfgdir.join("active");
        if !active_ptr.exists() {
            let mut f = fs::File::create(&active_ptr)?;
            f.write_all(b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        let profile = Profile::from_path(&profdir.join(format!("{active_name}.toml")))?;

        Ok(Self {
            active_name,
            profile,
            config_dir: cfgdir,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{name}.toml"))
    }

    pub fn reload(&mut self) -> Result<()> {
        self.profile = Profile::from_path(&self.profile_path(&self.active_name))?;
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Profile> {
        Profile::from_path(&self.profile_path(name))
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profile_path(name);
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        let profile = Profile::from_path(&p)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        self.profile = profile;
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }
}
