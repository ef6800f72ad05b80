//! Serde adapters that keep the `{"x":..,"y":..}` object layout of the
//! structured encoding while the in-memory types stay `glam` vectors.

pub(crate) mod opt_vec2 {
    use glam::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Xy {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    }

    pub fn serialize<S: Serializer>(value: &Option<Vec2>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => Xy { x: v.x, y: v.y }.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec2>, D::Error> {
        Ok(Option::<Xy>::deserialize(deserializer)?.map(|xy| Vec2::new(xy.x, xy.y)))
    }
}

/// UV rectangles are written as `{"x0","y0","x1","y1"}`; in memory they map
/// onto `Vec4(x0, y0, x1, y1)`.
pub(crate) mod opt_uv {
    use glam::Vec4;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Uv {
        #[serde(default)]
        x0: f32,
        #[serde(default)]
        y0: f32,
        #[serde(default)]
        x1: f32,
        #[serde(default)]
        y1: f32,
    }

    pub fn serialize<S: Serializer>(value: &Option<Vec4>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => Uv {
                x0: v.x,
                y0: v.y,
                x1: v.z,
                y1: v.w,
            }
            .serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec4>, D::Error> {
        Ok(Option::<Uv>::deserialize(deserializer)?.map(|uv| Vec4::new(uv.x0, uv.y0, uv.x1, uv.y1)))
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec4};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::opt_vec2")]
        pos: Option<Vec2>,
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::opt_uv")]
        uv: Option<Vec4>,
    }

    #[test]
    fn writes_named_components() {
        let holder = Holder {
            pos: Some(Vec2::new(1.5, -2.0)),
            uv: Some(Vec4::new(0.0, 0.25, 0.5, 1.0)),
        };
        let json = serde_json::to_value(&holder).unwrap();
        assert_eq!(json["pos"]["x"], 1.5);
        assert_eq!(json["pos"]["y"], -2.0);
        assert_eq!(json["uv"]["y0"], 0.25);
        assert_eq!(json["uv"]["x1"], 0.5);
    }

    #[test]
    fn missing_components_default_to_zero() {
        let holder: Holder = serde_json::from_str(r#"{"pos":{"y":3}}"#).unwrap();
        assert_eq!(holder.pos, Some(Vec2::new(0.0, 3.0)));
        assert_eq!(holder.uv, None);
    }
}
