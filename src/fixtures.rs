//! Static sample data used as benchmark fixtures.
//!
//! The financial questions step up in complexity so latency can be compared
//! across prompt difficulty; the sample document feeds the document-Q&A
//! inputs where the document segment is the cacheable part.

use crate::input::{Input, NamedInput, Segment};

/// Financial questions of increasing complexity (1 = simple, 4 = complex)
pub const FINANCIAL_QUESTIONS: [&str; 4] = [
    "What is the difference between a savings account and a checking account?",
    "If I have $10,000 to invest for retirement and I'm 35 years old, what are my \
     options and their pros and cons?",
    "I'm considering a 30-year mortgage at 5.5% APR for $350,000. My property tax is \
     estimated at $5,000 per year, and insurance at $1,200 annually. I can make a down \
     payment of 15% or 20%. What would my monthly payment be in each scenario, and how \
     much would I save over the life of the loan with the 20% down payment? Additionally, \
     analyze how each option would perform in high-inflation (7%+) and low-inflation \
     (1-2%) scenarios, and calculate the risk-adjusted return using a Sharpe ratio \
     analysis. Finally create an amortization chart.",
    "I'm comparing three investment options: 1. A rental property costing $300,000 with \
     expected rental income of $2,000/month and expenses of $600/month. 2. An S&P 500 \
     index fund with historical average returns of 10% annually. 3. A small business \
     investment requiring $300,000 with projected annual profit of $45,000. Assuming a \
     30-year timeline, 3% inflation, 25% tax rate on profits, and that the property \
     appreciates at 3% annually, which investment would likely yield the highest \
     after-tax return? Show your calculations.",
];

/// Sample document for document-Q&A fixtures
pub const SAMPLE_DOCUMENT: &str = "\
# Premium Savings Account - Terms and Conditions

## Account Overview
The Premium Savings Account is a high-yield savings account designed for customers who \
maintain a minimum balance of $5,000. This account offers tiered interest rates based on \
your balance and provides monthly interest compounding.

## Interest Rates
Current rates as of January 1, 2025:
- $5,000 - $24,999: 2.50% APY
- $25,000 - $99,999: 3.25% APY
- $100,000+: 3.75% APY

Interest is calculated daily and compounded monthly. Rates are variable and may change \
at any time based on market conditions.

## Fees and Charges
- Monthly maintenance fee: $15 (waived if minimum daily balance of $5,000 is maintained)
- Excessive withdrawal fee: $10 per withdrawal after 6 withdrawals per month
- Account closure fee: $25 if closed within 90 days of opening
- Paper statement fee: $3 per month (waived with e-statements)

## Eligibility Requirements
- Must be 18 years or older
- Valid Social Security Number or Individual Taxpayer Identification Number
- US citizen or permanent resident
- Minimum opening deposit of $5,000

## Early Withdrawal Penalties
While this is not a time-deposit account like a CD, excessive withdrawals beyond the \
allowed 6 per month will incur a $10 fee per transaction as noted in the Fees section.

## Account Protection
Funds in this account are FDIC insured up to $250,000 per depositor, per ownership \
category.
";

/// Questions answered by [`SAMPLE_DOCUMENT`]
pub const DOCUMENT_QUESTIONS: [&str; 4] = [
    "What are the interest rates for the Premium Savings Account?",
    "What is the minimum balance requirement and what happens if I don't meet it?",
    "How many withdrawals can I make per month without paying a fee?",
    "Is there an early withdrawal penalty for this account?",
];

/// The financial questions as positionally named plain-text inputs
#[must_use]
pub fn financial_question_inputs() -> Vec<NamedInput> {
    NamedInput::sequence(
        FINANCIAL_QUESTIONS
            .iter()
            .map(|q| Input::text(q))
            .collect(),
    )
}

/// Document-Q&A inputs: a cacheable document segment followed by the question.
///
/// The document preamble is identical across all inputs so repeated calls can
/// hit the endpoint's prompt cache when the profile enables it.
#[must_use]
pub fn document_qa_inputs(document: &str) -> Vec<NamedInput> {
    let preamble = format!("I need help understanding this document:\n\n{document}");
    DOCUMENT_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, question)| {
            NamedInput::new(
                &format!("doc-q{}", i + 1),
                Input::segments(vec![
                    Segment::cacheable(&preamble),
                    Segment::text(question),
                ]),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_inputs_are_positional() {
        let inputs = financial_question_inputs();
        assert_eq!(inputs.len(), 4);
        assert_eq!(inputs[0].name, "prompt-1");
        assert_eq!(inputs[3].name, "prompt-4");
    }

    #[test]
    fn test_document_qa_inputs_share_cacheable_preamble() {
        let inputs = document_qa_inputs(SAMPLE_DOCUMENT);
        assert_eq!(inputs.len(), 4);

        let mut preambles = Vec::new();
        for named in &inputs {
            match &named.input {
                Input::Segments(segments) => {
                    assert_eq!(segments.len(), 2);
                    assert!(segments[0].cacheable);
                    assert!(!segments[1].cacheable);
                    preambles.push(segments[0].text.clone());
                }
                Input::Text(_) => panic!("expected structured input"),
            }
        }
        assert!(preambles.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_questions_increase_in_length() {
        assert!(FINANCIAL_QUESTIONS[0].len() < FINANCIAL_QUESTIONS[2].len());
    }
}
