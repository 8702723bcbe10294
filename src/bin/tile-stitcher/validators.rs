pub fn is_numeric_in(min: u64, max: u64) -> impl Fn(String) -> Result<(), String> {
    move |v: String| {
        let val = v.parse::<u64>().map_err(|_| "must be numeric".to_owned())?;

        if val < min {
            return Err(format!("must be >= {}", min));
        } else if val > max {
            return Err(format!("must be <= {}", max));
        }

        Ok(())
    }
}

/// Latitudes and longitudes beyond the projection (infinity included) are
/// clamped later, so only NaN is refused here.
pub fn is_geo_coord(v: String) -> Result<(), String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if val.is_nan() {
        return Err("must be a number".to_owned());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_bounds() {
        let v = is_numeric_in(1, 23);
        assert!(v("1".to_owned()).is_ok());
        assert!(v("23".to_owned()).is_ok());
        assert!(v("0".to_owned()).is_err());
        assert!(v("24".to_owned()).is_err());
        assert!(v("x".to_owned()).is_err());
    }

    #[test]
    fn geo_coords() {
        assert!(is_geo_coord("-122.14".to_owned()).is_ok());
        assert!(is_geo_coord("95".to_owned()).is_ok());
        assert!(is_geo_coord("-inf".to_owned()).is_ok());
        assert!(is_geo_coord("inf".to_owned()).is_ok());
        assert!(is_geo_coord("NaN".to_owned()).is_err());
        assert!(is_geo_coord("north".to_owned()).is_err());
    }
}
