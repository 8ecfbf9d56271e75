// jv-core/src/units.rs
//
// Solver internals are cgs. Observational inputs arrive as uom SI
// quantities and are converted once at the boundary.

use uom::si::f64::{
    Length as UomLength, Mass as UomMass, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

pub type Length = UomLength;
pub type Mass = UomMass;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn km(v: f64) -> Length {
    use uom::si::length::kilometer;
    Length::new::<kilometer>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

/// Mass in grams.
#[inline]
pub fn to_grams(mass: Mass) -> f64 {
    use uom::si::mass::gram;
    mass.get::<gram>()
}

/// Length in centimeters.
#[inline]
pub fn to_cm(length: Length) -> f64 {
    use uom::si::length::centimeter;
    length.get::<centimeter>()
}

#[inline]
pub fn to_seconds(time: Time) -> f64 {
    use uom::si::time::second;
    time.get::<second>()
}

#[inline]
pub fn to_kelvin(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

/// Pressure in dyn cm^-2.
#[inline]
pub fn to_dyn_per_cm2(p: Pressure) -> f64 {
    use uom::si::pressure::dyne_per_square_centimeter;
    p.get::<dyne_per_square_centimeter>()
}

pub mod constants {
    /// Newtonian gravitational constant [cm^3 g^-1 s^-2].
    pub const G_CGS: f64 = 6.674_30e-8;

    /// One bar in dyn cm^-2.
    pub const BAR_CGS: f64 = 1.0e6;

    /// log10 of the default surface pressure (1 bar).
    pub const LOGP_SURFACE: f64 = 6.0;
}
