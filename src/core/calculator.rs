//! Layout and pricing calculator.
//!
//! Maps a proposal request plus the matching product and price onto a fully resolved
//! quote: cabinet grid, built dimensions, panel and source resolutions, and totals.
//! Everything here is pure and synchronous; catalog lookups happen in
//! [`crate::core::quote`] before this module is called.

use crate::{
    entities::{ApplicationCategory, ProductLine, TaxRegime, price, product},
    errors::{Error, FieldIssue, Result},
};
use serde::{Deserialize, Serialize};

/// Multiplier applied to the total when the quote is issued without DIFAL.
pub const WITHOUT_DIFAL_FACTOR: f64 = 0.85;

/// Source content is recommended at twice the panel resolution on each axis.
pub const VIDEO_OVERSAMPLING: i32 = 2;

/// Physical size of one cabinet in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CabinetModule {
    /// Width of one cabinet
    pub width_m: f64,
    /// Height of one cabinet
    pub height_m: f64,
}

/// Rental cabinets are 0.50 m wide and 1.00 m tall.
pub const RENTAL_MODULE: CabinetModule = CabinetModule {
    width_m: 0.50,
    height_m: 1.00,
};

/// Fixed-installation cabinets are 0.96 m square.
pub const FIXED_MODULE: CabinetModule = CabinetModule {
    width_m: 0.96,
    height_m: 0.96,
};

impl CabinetModule {
    /// Module used by a product line.
    #[must_use]
    pub const fn for_line(line: ProductLine) -> Self {
        match line {
            ProductLine::Rental => RENTAL_MODULE,
            ProductLine::Fixed => FIXED_MODULE,
        }
    }
}

/// What the customer asked for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Application category; with `pixel_pitch` it selects the product
    pub application: ApplicationCategory,
    /// Pixel pitch in millimeters
    pub pixel_pitch: f64,
    /// Requested width in meters
    pub nominal_width: f64,
    /// Requested height in meters
    pub nominal_height: f64,
    /// Tax regime; `WithoutDifal` triggers the discount
    pub tax_regime: TaxRegime,
}

/// Fully resolved calculation, carrying the product and price it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteCalculation {
    /// Cabinets across
    pub width_cabinets: i32,
    /// Cabinets down
    pub height_cabinets: i32,
    /// `width_cabinets * height_cabinets`
    pub total_cabinets: i32,
    /// Built width in meters
    pub real_width: f64,
    /// Built height in meters
    pub real_height: f64,
    /// Horizontal panel resolution in pixels
    pub panel_resolution_h: i32,
    /// Vertical panel resolution in pixels
    pub panel_resolution_v: i32,
    /// Recommended horizontal source resolution
    pub video_resolution_h: i32,
    /// Recommended vertical source resolution
    pub video_resolution_v: i32,
    /// Price of one cabinet
    pub unit_value: f64,
    /// Flat accessories price
    pub accessories_value: f64,
    /// Cabinets times unit value plus accessories
    pub total_value: f64,
    /// Total after the tax-regime discount
    pub discounted_value: f64,
    /// Product used
    pub product: product::Model,
    /// Price row used
    pub price: price::Model,
}

/// Checks the numeric request fields, reporting every failing field at once.
///
/// # Errors
/// Returns [`Error::InvalidInput`] listing each field that is non-finite or not positive.
pub fn validate_request(request: &QuoteRequest) -> Result<()> {
    let mut issues = Vec::new();

    for (field, value) in [
        ("pixel_pitch", request.pixel_pitch),
        ("nominal_width", request.nominal_width),
        ("nominal_height", request.nominal_height),
    ] {
        if let Some(issue) = positive_issue(field, value) {
            issues.push(issue);
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidInput { issues })
    }
}

fn positive_issue(field: &'static str, value: f64) -> Option<FieldIssue> {
    if !value.is_finite() {
        Some(FieldIssue::new(field, "must be a finite number"))
    } else if value <= 0.0 {
        Some(FieldIssue::new(field, format!("must be positive, got {value}")))
    } else {
        None
    }
}

/// Number of cabinets needed along one axis.
///
/// Rental rounds up so the display always covers the requested size; fixed installs
/// round to the nearest whole cabinet.
#[must_use]
pub fn grid_count(line: ProductLine, nominal_m: f64, module_m: f64) -> f64 {
    let ratio = nominal_m / module_m;
    match line {
        ProductLine::Rental => ratio.ceil(),
        ProductLine::Fixed => ratio.round(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_count(field: &'static str, value: f64) -> Result<i32> {
    if value < 1.0 {
        return Err(Error::invalid(
            field,
            "display is smaller than a single cabinet",
        ));
    }
    if value > f64::from(i32::MAX) {
        return Err(Error::invalid(field, "display is too large to quote"));
    }
    Ok(value as i32)
}

#[allow(clippy::cast_possible_truncation)]
fn to_pixels(field: &'static str, real_m: f64, pixel_pitch: f64) -> Result<i32> {
    let pixels = (real_m * 1000.0 / pixel_pitch).round();
    if pixels > f64::from(i32::MAX / VIDEO_OVERSAMPLING) {
        return Err(Error::invalid(field, "resolution is too large to represent"));
    }
    Ok(pixels as i32)
}

/// Runs the layout and pricing calculation.
///
/// The product must be the one the request resolves to and the price must belong to it.
///
/// # Errors
/// Returns [`Error::InvalidInput`] when a request field is invalid, the product or price
/// does not match the request, the price values are negative, or the requested display
/// rounds to zero cabinets on either axis.
#[allow(clippy::float_cmp)]
pub fn calculate(
    request: &QuoteRequest,
    product: &product::Model,
    price: &price::Model,
) -> Result<QuoteCalculation> {
    validate_request(request)?;

    let mut issues = Vec::new();
    if product.application != request.application || product.pixel_pitch != request.pixel_pitch {
        issues.push(FieldIssue::new(
            "product",
            format!(
                "'{}' is not the {} product with pixel pitch {}mm",
                product.model, request.application, request.pixel_pitch
            ),
        ));
    }
    if price.product_id != product.id {
        issues.push(FieldIssue::new(
            "price",
            format!("price {} does not belong to product {}", price.id, product.id),
        ));
    }
    for (field, value) in [
        ("unit_value", price.unit_value),
        ("accessories_value", price.accessories_value),
    ] {
        if !value.is_finite() || value < 0.0 {
            issues.push(FieldIssue::new(field, "must be a non-negative number"));
        }
    }
    if !issues.is_empty() {
        return Err(Error::InvalidInput { issues });
    }

    let module = CabinetModule::for_line(product.line);
    let width_cabinets = to_count(
        "nominal_width",
        grid_count(product.line, request.nominal_width, module.width_m),
    )?;
    let height_cabinets = to_count(
        "nominal_height",
        grid_count(product.line, request.nominal_height, module.height_m),
    )?;
    let total_cabinets = width_cabinets
        .checked_mul(height_cabinets)
        .ok_or_else(|| Error::invalid("nominal_width", "display is too large to quote"))?;

    let real_width = f64::from(width_cabinets) * module.width_m;
    let real_height = f64::from(height_cabinets) * module.height_m;

    let panel_resolution_h = to_pixels("nominal_width", real_width, request.pixel_pitch)?;
    let panel_resolution_v = to_pixels("nominal_height", real_height, request.pixel_pitch)?;

    let total_value = f64::from(total_cabinets) * price.unit_value + price.accessories_value;
    let discounted_value = apply_tax_regime(request.tax_regime, total_value);

    tracing::debug!(
        product = %product.model,
        width_cabinets,
        height_cabinets,
        total_value,
        discounted_value,
        "Calculated quote"
    );

    Ok(QuoteCalculation {
        width_cabinets,
        height_cabinets,
        total_cabinets,
        real_width,
        real_height,
        panel_resolution_h,
        panel_resolution_v,
        video_resolution_h: panel_resolution_h * VIDEO_OVERSAMPLING,
        video_resolution_v: panel_resolution_v * VIDEO_OVERSAMPLING,
        unit_value: price.unit_value,
        accessories_value: price.accessories_value,
        total_value,
        discounted_value,
        product: product.clone(),
        price: price.clone(),
    })
}

/// Discount policy. Only `WithoutDifal` changes the total.
#[must_use]
pub fn apply_tax_regime(tax_regime: TaxRegime, total_value: f64) -> f64 {
    match tax_regime {
        TaxRegime::WithoutDifal => total_value * WITHOUT_DIFAL_FACTOR,
        TaxRegime::WithDifal => total_value,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::errors::ErrorKind;
    use chrono::Utc;

    fn product(line: ProductLine, application: ApplicationCategory, pitch: f64) -> product::Model {
        product::Model {
            id: 1,
            model: format!("P{pitch} {application}"),
            line,
            pixel_pitch: pitch,
            cabinet: "500×1000mm".to_string(),
            weight_kg: 12.0,
            power_w: 180.0,
            brightness_nits: 5500.0,
            voltage: "110-220V".to_string(),
            lifetime_hours: 100_000,
            ip_rating: "IP65".to_string(),
            warranty_months: 24,
            accessories: "Cabo de sinal".to_string(),
            application,
            created_at: Utc::now(),
        }
    }

    fn price(unit_value: f64, accessories_value: f64) -> price::Model {
        price::Model {
            id: 10,
            product_id: 1,
            unit_value,
            accessories_value,
            created_at: Utc::now(),
        }
    }

    fn request(
        application: ApplicationCategory,
        pitch: f64,
        width: f64,
        height: f64,
        tax_regime: TaxRegime,
    ) -> QuoteRequest {
        QuoteRequest {
            application,
            pixel_pitch: pitch,
            nominal_width: width,
            nominal_height: height,
            tax_regime,
        }
    }

    fn issue_fields(err: &Error) -> Vec<&'static str> {
        match err {
            Error::InvalidInput { issues } => issues.iter().map(|i| i.field).collect(),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_outdoor_rental_scenario() -> Result<()> {
        let prod = product(ProductLine::Rental, ApplicationCategory::OutdoorRental, 4.0);
        let req = request(
            ApplicationCategory::OutdoorRental,
            4.0,
            6.0,
            3.0,
            TaxRegime::WithoutDifal,
        );

        let calc = calculate(&req, &prod, &price(1800.0, 800.0))?;

        assert_eq!(calc.width_cabinets, 12);
        assert_eq!(calc.height_cabinets, 3);
        assert_eq!(calc.total_cabinets, 36);
        assert_eq!(calc.real_width, 6.0);
        assert_eq!(calc.real_height, 3.0);
        assert_eq!(calc.panel_resolution_h, 1500);
        assert_eq!(calc.panel_resolution_v, 750);
        assert_eq!(calc.video_resolution_h, 3000);
        assert_eq!(calc.video_resolution_v, 1500);
        assert_eq!(calc.total_value, 65600.0);
        assert!((calc.discounted_value - 55760.0).abs() < 1e-9);
        assert_eq!(calc.unit_value, 1800.0);
        assert_eq!(calc.accessories_value, 800.0);
        assert_eq!(calc.product, prod);
        Ok(())
    }

    #[test]
    fn test_indoor_fixed_scenario_rounds_to_nearest() -> Result<()> {
        let prod = product(ProductLine::Fixed, ApplicationCategory::IndoorFixed, 2.5);
        let req = request(
            ApplicationCategory::IndoorFixed,
            2.5,
            2.0,
            2.0,
            TaxRegime::WithDifal,
        );

        let calc = calculate(&req, &prod, &price(1500.0, 700.0))?;

        assert_eq!(calc.width_cabinets, 2);
        assert_eq!(calc.height_cabinets, 2);
        assert_eq!(calc.total_cabinets, 4);
        assert!((calc.real_width - 1.92).abs() < 1e-12);
        assert!((calc.real_height - 1.92).abs() < 1e-12);
        assert!(calc.real_width < req.nominal_width);
        assert_eq!(calc.panel_resolution_h, 768);
        assert_eq!(calc.total_value, 4.0 * 1500.0 + 700.0);
        assert_eq!(calc.discounted_value, calc.total_value);
        Ok(())
    }

    #[test]
    fn test_fixed_can_overshoot_nominal() -> Result<()> {
        let prod = product(ProductLine::Fixed, ApplicationCategory::OutdoorFixed, 4.0);
        // 2.5 / 0.96 = 2.604 -> 3 cabinets -> 2.88 m
        let req = request(
            ApplicationCategory::OutdoorFixed,
            4.0,
            2.5,
            1.0,
            TaxRegime::WithDifal,
        );

        let calc = calculate(&req, &prod, &price(2200.0, 1000.0))?;
        assert_eq!(calc.width_cabinets, 3);
        assert_eq!(calc.height_cabinets, 1);
        assert!(calc.real_width > req.nominal_width);
        Ok(())
    }

    #[test]
    fn test_rental_small_width_still_gets_one_cabinet() -> Result<()> {
        let prod = product(ProductLine::Rental, ApplicationCategory::IndoorRental, 2.5);
        let req = request(
            ApplicationCategory::IndoorRental,
            2.5,
            0.4,
            0.2,
            TaxRegime::WithDifal,
        );

        let calc = calculate(&req, &prod, &price(1200.0, 500.0))?;
        assert_eq!(calc.width_cabinets, 1);
        assert_eq!(calc.height_cabinets, 1);
        assert_eq!(calc.real_width, 0.5);
        assert_eq!(calc.real_height, 1.0);
        Ok(())
    }

    #[test]
    fn test_fixed_display_below_half_module_is_rejected() {
        let prod = product(ProductLine::Fixed, ApplicationCategory::IndoorFixed, 2.5);
        let req = request(
            ApplicationCategory::IndoorFixed,
            2.5,
            0.4,
            2.0,
            TaxRegime::WithDifal,
        );

        let err = calculate(&req, &prod, &price(1500.0, 700.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(issue_fields(&err), vec!["nominal_width"]);
    }

    #[test]
    fn test_invalid_fields_are_all_reported() {
        let req = request(
            ApplicationCategory::IndoorRental,
            f64::NAN,
            0.0,
            -1.0,
            TaxRegime::WithDifal,
        );

        let err = validate_request(&req).unwrap_err();
        assert_eq!(
            issue_fields(&err),
            vec!["pixel_pitch", "nominal_width", "nominal_height"]
        );
    }

    #[test]
    fn test_product_mismatch_is_rejected() {
        let prod = product(ProductLine::Rental, ApplicationCategory::IndoorRental, 3.0);
        let req = request(
            ApplicationCategory::IndoorRental,
            2.5,
            2.0,
            2.0,
            TaxRegime::WithDifal,
        );

        let err = calculate(&req, &prod, &price(1000.0, 500.0)).unwrap_err();
        assert_eq!(issue_fields(&err), vec!["product"]);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let prod = product(ProductLine::Rental, ApplicationCategory::IndoorRental, 2.5);
        let req = request(
            ApplicationCategory::IndoorRental,
            2.5,
            2.0,
            2.0,
            TaxRegime::WithDifal,
        );

        let err = calculate(&req, &prod, &price(-1.0, f64::INFINITY)).unwrap_err();
        assert_eq!(issue_fields(&err), vec!["unit_value", "accessories_value"]);
    }

    #[test]
    fn test_layout_properties_hold_across_sizes() -> Result<()> {
        let rental = product(ProductLine::Rental, ApplicationCategory::OutdoorRental, 5.0);
        let fixed = product(ProductLine::Fixed, ApplicationCategory::OutdoorFixed, 5.0);
        let pr = price(1600.0, 800.0);

        for step in 1..=40 {
            let size = f64::from(step) * 0.37;

            let req = request(
                ApplicationCategory::OutdoorRental,
                5.0,
                size,
                size,
                TaxRegime::WithDifal,
            );
            let calc = calculate(&req, &rental, &pr)?;
            assert_eq!(f64::from(calc.width_cabinets), (size / 0.5).ceil());
            assert_eq!(f64::from(calc.height_cabinets), size.ceil());
            assert_eq!(calc.real_width, f64::from(calc.width_cabinets) * 0.5);
            assert!(calc.real_width >= size);
            assert!(calc.real_height >= size);
            assert_eq!(calc.total_cabinets, calc.width_cabinets * calc.height_cabinets);
            assert_eq!(calc.video_resolution_h, 2 * calc.panel_resolution_h);
            assert_eq!(calc.video_resolution_v, 2 * calc.panel_resolution_v);

            if size / 0.96 >= 0.5 {
                let req = request(
                    ApplicationCategory::OutdoorFixed,
                    5.0,
                    size,
                    size,
                    TaxRegime::WithoutDifal,
                );
                let calc = calculate(&req, &fixed, &pr)?;
                assert_eq!(f64::from(calc.width_cabinets), (size / 0.96).round());
                assert_eq!(calc.total_cabinets, calc.width_cabinets * calc.height_cabinets);
                assert_eq!(calc.discounted_value, calc.total_value * 0.85);
            }
        }
        Ok(())
    }

    #[test]
    fn test_discount_only_without_difal() {
        assert_eq!(apply_tax_regime(TaxRegime::WithDifal, 1000.0), 1000.0);
        assert_eq!(apply_tax_regime(TaxRegime::WithoutDifal, 1000.0), 850.0);
    }

    #[test]
    fn test_calculation_is_deterministic() -> Result<()> {
        let prod = product(ProductLine::Fixed, ApplicationCategory::IndoorFixed, 3.0);
        let req = request(
            ApplicationCategory::IndoorFixed,
            3.0,
            5.3,
            2.7,
            TaxRegime::WithoutDifal,
        );
        let pr = price(1300.0, 700.0);

        let first = calculate(&req, &prod, &pr)?;
        let second = calculate(&req, &prod, &pr)?;
        assert_eq!(first, second);
        assert_eq!(first.discounted_value.to_bits(), second.discounted_value.to_bits());
        Ok(())
    }
}
