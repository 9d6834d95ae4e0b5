use ndarray::{Array1, Zip};

/// Natural logarithm of the posterior density, up to an additive constant
///
/// Implementations signal hard constraint violations by returning
/// [f64::NEG_INFINITY], never by panicking: the sampler turns an infinitely
/// negative log-density into a certain rejection through the ordinary
/// acceptance test. Densities are compared only by differences, so any
/// normalization constant may be dropped.
pub trait LnPdf {
    fn ln_pdf(&self, params: &[f64]) -> f64;
}

impl<F> LnPdf for F
where
    F: Fn(&[f64]) -> f64,
{
    fn ln_pdf(&self, params: &[f64]) -> f64 {
        self(params)
    }
}

/// Log-posterior for data with a constant unknown error
///
/// The parameter vector is `[model_params.., sigma]`: the trailing element is
/// the unknown per-point noise scale. Negative `sigma` yields `-inf`.
#[derive(Clone, Debug)]
pub struct ConstantErrorLnPdf<F> {
    x: Array1<f64>,
    y: Array1<f64>,
    model: F,
}

impl<F> ConstantErrorLnPdf<F>
where
    F: Fn(&[f64], f64) -> f64,
{
    pub fn new(x: &[f64], y: &[f64], model: F) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have equal lengths");
        Self {
            x: x.to_vec().into(),
            y: y.to_vec().into(),
            model,
        }
    }
}

impl<F> LnPdf for ConstantErrorLnPdf<F>
where
    F: Fn(&[f64], f64) -> f64,
{
    fn ln_pdf(&self, params: &[f64]) -> f64 {
        let (model_params, sigma) = params.split_at(params.len() - 1);
        let sigma = sigma[0];
        if sigma < 0.0 {
            return f64::NEG_INFINITY;
        }
        Zip::from(&self.x).and(&self.y).fold(0.0, |sum, &x, &y| {
            let dy = (self.model)(model_params, x) - y;
            sum - dy * dy / (2.0 * sigma * sigma) - sigma.ln()
        })
    }
}

/// Log-posterior for data with known per-point errors
///
/// The parameter vector holds the model parameters only. The Gaussian
/// normalization term is constant and omitted.
#[derive(Clone, Debug)]
pub struct KnownErrorLnPdf<F> {
    x: Array1<f64>,
    y: Array1<f64>,
    yerr: Array1<f64>,
    model: F,
}

impl<F> KnownErrorLnPdf<F>
where
    F: Fn(&[f64], f64) -> f64,
{
    pub fn new(x: &[f64], y: &[f64], yerr: &[f64], model: F) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have equal lengths");
        assert_eq!(x.len(), yerr.len(), "x and yerr must have equal lengths");
        Self {
            x: x.to_vec().into(),
            y: y.to_vec().into(),
            yerr: yerr.to_vec().into(),
            model,
        }
    }
}

impl<F> LnPdf for KnownErrorLnPdf<F>
where
    F: Fn(&[f64], f64) -> f64,
{
    fn ln_pdf(&self, params: &[f64]) -> f64 {
        Zip::from(&self.x)
            .and(&self.y)
            .and(&self.yerr)
            .fold(0.0, |sum, &x, &y, &sy| {
                let dy = (self.model)(params, x) - y;
                sum - dy * dy / (2.0 * sy * sy)
            })
    }
}

/// Log-posterior for data with known per-point errors plus unknown intrinsic
/// scatter
///
/// The parameter vector is `[model_params.., scatter]`. The measurement error
/// and the scatter are combined in quadrature into the per-point variance.
/// Negative `scatter` yields `-inf`.
#[derive(Clone, Debug)]
pub struct ScatterErrorLnPdf<F> {
    x: Array1<f64>,
    y: Array1<f64>,
    yerr: Array1<f64>,
    model: F,
}

impl<F> ScatterErrorLnPdf<F>
where
    F: Fn(&[f64], f64) -> f64,
{
    pub fn new(x: &[f64], y: &[f64], yerr: &[f64], model: F) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have equal lengths");
        assert_eq!(x.len(), yerr.len(), "x and yerr must have equal lengths");
        Self {
            x: x.to_vec().into(),
            y: y.to_vec().into(),
            yerr: yerr.to_vec().into(),
            model,
        }
    }
}

impl<F> LnPdf for ScatterErrorLnPdf<F>
where
    F: Fn(&[f64], f64) -> f64,
{
    fn ln_pdf(&self, params: &[f64]) -> f64 {
        let (model_params, scatter) = params.split_at(params.len() - 1);
        let scatter = scatter[0];
        if scatter < 0.0 {
            return f64::NEG_INFINITY;
        }
        Zip::from(&self.x)
            .and(&self.y)
            .and(&self.yerr)
            .fold(0.0, |sum, &x, &y, &sy| {
                let dy = (self.model)(model_params, x) - y;
                let var = sy * sy + scatter * scatter;
                sum - dy * dy / (2.0 * var) - var.sqrt().ln()
            })
    }
}
