use burn::{
    nn::{
        attention::{generate_autoregressive_mask, MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::BinaryCrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

/// GPT-2 style model hyper-parameters.
///
/// Field names follow the keys of a GPT-2 `config.json`, so an
/// existing model config file loads with `GptConfig::load(path)`.
/// Keys this model does not use (`n_positions`,
/// `initializer_range`, ...) are ignored. Dropout and epsilon keys
/// are optional; absent ones fall back to the GPT-2 defaults.
// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
#[derive(Config, Debug)]
pub struct GptConfig {
    pub vocab_size: usize,
    /// Context length; also the fixed sequence length of the data
    pub n_ctx:      usize,
    pub n_embd:     usize,
    pub n_head:     usize,
    pub n_layer:    usize,
    pub embd_pdrop:  Option<f64>,
    pub resid_pdrop: Option<f64>,
    pub attn_pdrop:  Option<f64>,
    pub layer_norm_epsilon: Option<f64>,
}

const DEFAULT_PDROP: f64 = 0.1;
const DEFAULT_LAYER_NORM_EPS: f64 = 1e-5;

impl GptConfig {
    pub fn embd_dropout(&self) -> f64 {
        self.embd_pdrop.unwrap_or(DEFAULT_PDROP)
    }

    pub fn resid_dropout(&self) -> f64 {
        self.resid_pdrop.unwrap_or(DEFAULT_PDROP)
    }

    pub fn attn_dropout(&self) -> f64 {
        self.attn_pdrop.unwrap_or(DEFAULT_PDROP)
    }

    pub fn layer_norm_eps(&self) -> f64 {
        self.layer_norm_epsilon.unwrap_or(DEFAULT_LAYER_NORM_EPS)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> GptModel<B> {
        let wte = EmbeddingConfig::new(self.vocab_size, self.n_embd).init(device);
        let wpe = EmbeddingConfig::new(self.n_ctx, self.n_embd).init(device);
        let blocks: Vec<GptBlock<B>> = (0..self.n_layer)
            .map(|_| self.build_block(device))
            .collect();
        let ln_f = LayerNormConfig::new(self.n_embd)
            .with_epsilon(self.layer_norm_eps())
            .init(device);
        let dropout = DropoutConfig::new(self.embd_dropout()).init();
        GptModel { wte, wpe, blocks, ln_f, dropout }
    }

    fn build_block<B: Backend>(&self, device: &B::Device) -> GptBlock<B> {
        let attn = MultiHeadAttentionConfig::new(self.n_embd, self.n_head)
            .with_dropout(self.attn_dropout())
            .init(device);
        let mlp_fc   = LinearConfig::new(self.n_embd, 4 * self.n_embd).init(device);
        let mlp_proj = LinearConfig::new(4 * self.n_embd, self.n_embd).init(device);
        let ln_1 = LayerNormConfig::new(self.n_embd).with_epsilon(self.layer_norm_eps()).init(device);
        let ln_2 = LayerNormConfig::new(self.n_embd).with_epsilon(self.layer_norm_eps()).init(device);
        let dropout = DropoutConfig::new(self.resid_dropout()).init();
        GptBlock { attn, mlp_fc, mlp_proj, ln_1, ln_2, dropout }
    }
}

/// Pre-norm transformer block with causal self-attention.
#[derive(Module, Debug)]
pub struct GptBlock<B: Backend> {
    pub attn:     MultiHeadAttention<B>,
    pub mlp_fc:   Linear<B>,
    pub mlp_proj: Linear<B>,
    pub ln_1:     LayerNorm<B>,
    pub ln_2:     LayerNorm<B>,
    pub dropout:  Dropout,
}

impl<B: Backend> GptBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>, mask: Tensor<B, 3, Bool>) -> Tensor<B, 3> {
        let h = self.ln_1.forward(x.clone());
        let attn = self.attn.forward(MhaInput::self_attn(h).mask_attn(mask)).context;
        let x = x + self.dropout.forward(attn);

        let h = self.mlp_proj.forward(
            burn::tensor::activation::gelu(self.mlp_fc.forward(self.ln_2.forward(x.clone())))
        );
        x + self.dropout.forward(h)
    }
}

#[derive(Module, Debug)]
pub struct GptModel<B: Backend> {
    pub wte:     Embedding<B>,
    pub wpe:     Embedding<B>,
    pub blocks:  Vec<GptBlock<B>>,
    pub ln_f:    LayerNorm<B>,
    pub dropout: Dropout,
}

impl<B: Backend> GptModel<B> {
    /// input_ids: [batch, seq_len] → hidden states [batch, seq_len, n_embd]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let tok_emb = self.wte.forward(input_ids);
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.wpe.forward(positions);

        // each position only attends to itself and earlier positions
        let mask = generate_autoregressive_mask::<B>(batch_size, seq_len, &device);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for block in &self.blocks {
            x = block.forward(x, mask.clone());
        }
        self.ln_f.forward(x)
    }
}

/// GPT backbone plus a bias-free linear head on the final position.
#[derive(Config, Debug)]
pub struct GptClassifierConfig {
    pub gpt:        GptConfig,
    pub num_labels: usize,
}

impl GptClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GptClassifier<B> {
        GptClassifier {
            gpt:  self.gpt.init(device),
            head: LinearConfig::new(self.gpt.n_embd, self.num_labels)
                .with_bias(false)
                .init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct GptClassifier<B: Backend> {
    pub gpt:  GptModel<B>,
    pub head: Linear<B>,
}

impl<B: Backend> GptClassifier<B> {
    /// input_ids: [batch, seq_len] → logits [batch, num_labels]
    ///
    /// Only the last position is classified. Under the causal mask it
    /// is the one position that has seen the whole sequence, and the
    /// builder puts the [CLS] sentinel there.
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let hidden = self.gpt.forward(input_ids);
        let [batch_size, seq_len, n_embd] = hidden.dims();
        let last = hidden
            .slice([0..batch_size, seq_len - 1..seq_len, 0..n_embd])
            .reshape([batch_size, n_embd]);
        self.head.forward(last)
    }

    /// Binary cross-entropy with logits against one-hot targets.
    pub fn forward_loss(
        &self,
        input_ids: Tensor<B, 2, Int>,
        labels:    Tensor<B, 2, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(input_ids);
        let bce = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&logits.device());
        let loss = bce.forward(logits.clone(), labels);
        (loss, logits)
    }
}
