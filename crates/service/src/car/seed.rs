use models::Car;

#[allow(clippy::too_many_arguments)]
fn demo(id: &str, make: &str, model: &str, package: &str, color: &str, year: i32, category: &str, mileage: i64, price: i64) -> Car {
    Car {
        id: id.into(),
        make: make.into(),
        model: model.into(),
        package: Some(package.into()),
        color: color.into(),
        category: category.into(),
        year,
        mileage: Some(mileage),
        price: Some(price),
    }
}

/// Demo inventory loaded at startup when `store.seed` is enabled.
pub fn demo_cars() -> Vec<Car> {
    vec![
        demo("JHK290XJ", "Ford", "F10", "Base", "Silver", 2010, "Truck", 120_123, 1_999_900),
        demo("FWL37LA", "Toyota", "Camry", "SE", "White", 2019, "Sedan", 3_999, 2_899_000),
        demo("1I3XJRLLC", "Toyota", "Rav4", "XSE", "Red", 2018, "SUV", 24_001, 2_275_000),
        demo("DKU43920S", "Ford", "Bronco", "Badlands", "Burnt Orange", 2022, "SUV", 1, 4_499_000),
    ]
}
