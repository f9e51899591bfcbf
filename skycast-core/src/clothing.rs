//! What-to-wear advice from current conditions and personal preferences.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{WeatherCondition, WeatherSnapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    Casual,
    Formal,
    Sporty,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Casual => "casual",
            Style::Formal => "formal",
            Style::Sporty => "sporty",
        }
    }

    pub const fn all() -> &'static [Style] {
        &[Style::Casual, Style::Formal, Style::Sporty]
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Style {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "casual" => Ok(Style::Casual),
            "formal" => Ok(Style::Formal),
            "sporty" => Ok(Style::Sporty),
            _ => Err(anyhow::anyhow!(
                "Unknown style '{value}'. Supported styles: casual, formal, sporty."
            )),
        }
    }
}

/// How strongly someone feels the cold, from 1 (very cold) to 5 (very warm).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColdSensitivity {
    VeryCold,
    Cold,
    #[default]
    Normal,
    Warm,
    VeryWarm,
}

impl ColdSensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColdSensitivity::VeryCold => "very-cold",
            ColdSensitivity::Cold => "cold",
            ColdSensitivity::Normal => "normal",
            ColdSensitivity::Warm => "warm",
            ColdSensitivity::VeryWarm => "very-warm",
        }
    }

    pub const fn all() -> &'static [ColdSensitivity] {
        &[
            ColdSensitivity::VeryCold,
            ColdSensitivity::Cold,
            ColdSensitivity::Normal,
            ColdSensitivity::Warm,
            ColdSensitivity::VeryWarm,
        ]
    }

    /// Degrees added to the felt temperature.
    pub fn offset(&self) -> f64 {
        match self {
            ColdSensitivity::VeryCold => -3.0,
            ColdSensitivity::Cold => -1.5,
            ColdSensitivity::Normal => 0.0,
            ColdSensitivity::Warm => 1.5,
            ColdSensitivity::VeryWarm => 3.0,
        }
    }
}

impl fmt::Display for ColdSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ColdSensitivity {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "1" | "very-cold" => Ok(ColdSensitivity::VeryCold),
            "2" | "cold" => Ok(ColdSensitivity::Cold),
            "3" | "normal" => Ok(ColdSensitivity::Normal),
            "4" | "warm" => Ok(ColdSensitivity::Warm),
            "5" | "very-warm" => Ok(ColdSensitivity::VeryWarm),
            _ => Err(anyhow::anyhow!(
                "Unknown cold sensitivity '{value}'. \
                 Use 1-5 or one of: very-cold, cold, normal, warm, very-warm."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemperatureCategory {
    Freezing,
    Cold,
    Cool,
    Comfortable,
    Warm,
    Hot,
}

impl TemperatureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freezing => "freezing",
            Self::Cold => "cold",
            Self::Cool => "cool",
            Self::Comfortable => "comfortable",
            Self::Warm => "warm",
            Self::Hot => "hot",
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            Self::Freezing => "Freezing weather, wear heavy winter clothing",
            Self::Cold => "Cold weather, wear warm coat and sweater",
            Self::Cool => "Cool weather, jacket or long sleeves recommended",
            Self::Comfortable => "Comfortable temperature, light jacket sufficient",
            Self::Warm => "Warm weather, T-shirt or short sleeves",
            Self::Hot => "Hot weather, wear light breathable clothing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClothingItem {
    DownJacket,
    WinterCoat,
    Jacket,
    LightJacket,
    Windbreaker,
    Sweater,
    LongSleeveShirt,
    ShortSleeveShirt,
    TShirt,
    Tank,
    ThermalUnderwear,
    ThermalPants,
    Jeans,
    WarmPants,
    CasualPants,
    LightPants,
    Shorts,
    Scarf,
    Gloves,
    Beanie,
    Cap,
    Sunglasses,
    Umbrella,
    Sunscreen,
    Boots,
    Sneakers,
    WaterproofShoes,
    Sandals,
}

impl ClothingItem {
    pub fn name(&self) -> &'static str {
        use ClothingItem::*;
        match self {
            DownJacket => "Down Jacket",
            WinterCoat => "Winter Coat",
            Jacket => "Jacket",
            LightJacket => "Light Jacket",
            Windbreaker => "Windbreaker",
            Sweater => "Sweater",
            LongSleeveShirt => "Long Sleeve Shirt",
            ShortSleeveShirt => "Short Sleeve Shirt",
            TShirt => "T-Shirt",
            Tank => "Tank Top",
            ThermalUnderwear => "Thermal Underwear",
            ThermalPants => "Thermal Pants",
            Jeans => "Jeans",
            WarmPants => "Warm Pants",
            CasualPants => "Casual Pants",
            LightPants => "Light Pants",
            Shorts => "Shorts",
            Scarf => "Scarf",
            Gloves => "Gloves",
            Beanie => "Beanie",
            Cap => "Cap",
            Sunglasses => "Sunglasses",
            Umbrella => "Umbrella",
            Sunscreen => "Sunscreen",
            Boots => "Boots",
            Sneakers => "Sneakers",
            WaterproofShoes => "Waterproof Shoes",
            Sandals => "Sandals",
        }
    }
}

impl fmt::Display for ClothingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClothingInput {
    pub temperature: f64,
    pub feels_like: f64,
    /// km/h
    pub wind_speed: f64,
    pub humidity: f64,
    /// Percent.
    pub precipitation: f64,
    pub uv_index: u8,
    pub condition: WeatherCondition,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub style: Style,
    pub sensitivity: ColdSensitivity,
}

impl ClothingInput {
    pub fn from_snapshot(
        snapshot: &WeatherSnapshot,
        style: Style,
        sensitivity: ColdSensitivity,
    ) -> Self {
        Self {
            temperature: snapshot.temperature,
            feels_like: snapshot.feels_like,
            wind_speed: snapshot.wind_speed,
            humidity: snapshot.humidity,
            precipitation: snapshot.precipitation,
            uv_index: snapshot.uv_index,
            condition: snapshot.condition,
            temperature_min: snapshot.temperature_min,
            temperature_max: snapshot.temperature_max,
            style,
            sensitivity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClothingRecommendation {
    pub category: TemperatureCategory,
    pub adjusted_temperature: f64,
    pub upper_body: Vec<ClothingItem>,
    pub lower_body: Vec<ClothingItem>,
    pub footwear: ClothingItem,
    pub accessories: Vec<ClothingItem>,
    pub avoid_items: Vec<String>,
    pub material_suggestion: Option<String>,
    pub summary: String,
    pub tips: Vec<String>,
}

const WIND_CHILL_ONSET_KMH: f64 = 10.0;
const WIND_CHILL_PER_KMH: f64 = 0.2;
const MUGGY_HUMIDITY: f64 = 70.0;
const MUGGY_TEMPERATURE: f64 = 20.0;
const MUGGY_BONUS: f64 = 2.0;
const WET_PRECIPITATION: f64 = 50.0;
const STRONG_UV: u8 = 6;
const WINDY_KMH: f64 = 20.0;
const HUMID: f64 = 80.0;
const LARGE_SWING: f64 = 10.0;

/// Felt temperature after wind chill, mugginess and personal sensitivity.
pub fn adjusted_temperature(input: &ClothingInput) -> f64 {
    let mut adjusted = input.feels_like;
    if input.wind_speed > WIND_CHILL_ONSET_KMH {
        adjusted -= (input.wind_speed - WIND_CHILL_ONSET_KMH) * WIND_CHILL_PER_KMH;
    }
    if input.humidity > MUGGY_HUMIDITY && input.temperature > MUGGY_TEMPERATURE {
        adjusted += MUGGY_BONUS;
    }
    adjusted + input.sensitivity.offset()
}

pub fn category_for(adjusted: f64) -> TemperatureCategory {
    match adjusted {
        t if t < -10.0 => TemperatureCategory::Freezing,
        t if t < 5.0 => TemperatureCategory::Cold,
        t if t < 15.0 => TemperatureCategory::Cool,
        t if t < 25.0 => TemperatureCategory::Comfortable,
        t if t < 30.0 => TemperatureCategory::Warm,
        // NaN lands here too, keeping the advisor total
        _ => TemperatureCategory::Hot,
    }
}

fn base_garments(
    category: TemperatureCategory,
    style: Style,
) -> (Vec<ClothingItem>, Vec<ClothingItem>) {
    use ClothingItem::*;
    use TemperatureCategory as T;

    let (upper, lower): (&[ClothingItem], &[ClothingItem]) = match (category, style) {
        (T::Freezing, Style::Casual) => (
            &[DownJacket, ThermalUnderwear, Sweater],
            &[ThermalPants, Jeans],
        ),
        (T::Freezing, Style::Formal) => (
            &[WinterCoat, ThermalUnderwear, Sweater],
            &[ThermalPants, WarmPants],
        ),
        (T::Freezing, Style::Sporty) => (
            &[DownJacket, ThermalUnderwear],
            &[ThermalPants, WarmPants],
        ),
        (T::Cold, Style::Casual) => (&[WinterCoat, Sweater, LongSleeveShirt], &[Jeans, WarmPants]),
        (T::Cold, Style::Formal) => (&[WinterCoat, Sweater, LongSleeveShirt], &[WarmPants]),
        (T::Cold, Style::Sporty) => (&[Jacket, Sweater], &[WarmPants]),
        (T::Cool, Style::Casual) => (&[Jacket, LongSleeveShirt], &[Jeans, CasualPants]),
        (T::Cool, Style::Formal) => (&[LightJacket, LongSleeveShirt], &[CasualPants]),
        (T::Cool, Style::Sporty) => (&[Windbreaker, LongSleeveShirt], &[CasualPants]),
        (T::Comfortable, Style::Casual) => (&[LightJacket, TShirt], &[Jeans, CasualPants]),
        (T::Comfortable, Style::Formal) => (&[LightJacket, ShortSleeveShirt], &[CasualPants]),
        (T::Comfortable, Style::Sporty) => (&[TShirt], &[Shorts, CasualPants]),
        (T::Warm, Style::Casual) => (&[TShirt, ShortSleeveShirt], &[Shorts, LightPants]),
        (T::Warm, Style::Formal) => (&[ShortSleeveShirt], &[LightPants]),
        (T::Warm, Style::Sporty) => (&[TShirt, Tank], &[Shorts]),
        (T::Hot, Style::Casual) => (&[TShirt, Tank], &[Shorts]),
        (T::Hot, Style::Formal) => (&[ShortSleeveShirt], &[LightPants]),
        (T::Hot, Style::Sporty) => (&[Tank], &[Shorts]),
    };
    (upper.to_vec(), lower.to_vec())
}

fn category_accessories(category: TemperatureCategory) -> &'static [ClothingItem] {
    use ClothingItem::*;
    match category {
        TemperatureCategory::Freezing => &[Scarf, Gloves, Beanie],
        TemperatureCategory::Cold => &[Scarf],
        TemperatureCategory::Hot => &[Sunglasses, Cap],
        _ => &[],
    }
}

fn dry_footwear(style: Style, adjusted: f64) -> ClothingItem {
    match style {
        Style::Casual if adjusted < 15.0 => ClothingItem::Boots,
        Style::Formal if adjusted < 25.0 => ClothingItem::Boots,
        Style::Casual | Style::Formal => ClothingItem::Sneakers,
        Style::Sporty if adjusted < 30.0 => ClothingItem::Sneakers,
        Style::Sporty => ClothingItem::Sandals,
    }
}

fn push_unique(items: &mut Vec<ClothingItem>, item: ClothingItem) {
    if !items.contains(&item) {
        items.push(item);
    }
}

/// Build a recommendation. Same input, same output.
pub fn recommend(input: &ClothingInput) -> ClothingRecommendation {
    let adjusted = adjusted_temperature(input);
    let category = category_for(adjusted);
    let (upper_body, lower_body) = base_garments(category, input.style);
    let mut accessories = category_accessories(category).to_vec();
    let mut avoid_items = Vec::new();
    let mut material_suggestion = None;

    let footwear = if input.precipitation > WET_PRECIPITATION {
        push_unique(&mut accessories, ClothingItem::Umbrella);
        ClothingItem::WaterproofShoes
    } else {
        dry_footwear(input.style, adjusted)
    };

    if input.uv_index > STRONG_UV {
        push_unique(&mut accessories, ClothingItem::Sunscreen);
        push_unique(&mut accessories, ClothingItem::Sunglasses);
    }

    if input.wind_speed > WINDY_KMH {
        push_unique(&mut accessories, ClothingItem::Windbreaker);
        avoid_items.push("Avoid wearing skirts".to_string());
    }

    if input.humidity > HUMID {
        material_suggestion = Some("Choose breathable materials".to_string());
    }

    ClothingRecommendation {
        category,
        adjusted_temperature: adjusted,
        upper_body,
        lower_body,
        footwear,
        accessories,
        avoid_items,
        material_suggestion,
        summary: category.summary().to_string(),
        tips: tips_for(input),
    }
}

fn tips_for(input: &ClothingInput) -> Vec<String> {
    let mut tips = Vec::new();
    if (input.temperature_max - input.temperature_min).abs() > LARGE_SWING {
        tips.push("Large temperature variation, layer your clothing".to_string());
    }
    let condition_tip = match input.condition {
        WeatherCondition::Rainy => Some("Rainy and slippery, wear waterproof shoes"),
        WeatherCondition::Snowy => Some("Cold and snowy, stay warm and wear non-slip shoes"),
        WeatherCondition::Foggy => Some("Low visibility, wear bright colors"),
        _ => None,
    };
    tips.extend(condition_tip.map(str::to_string));
    tips
}
