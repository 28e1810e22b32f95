/// `(x, y)` samples of a smooth monotone curve on [0, 1].
pub const REGRESSION_DATA: [(f32, f32); 101] = [
    (1.00000000, 1.00000000),
    (0.98999583, 0.99651180),
    (0.97999166, 0.99328127),
    (0.96998749, 0.99058382),
    (0.95998332, 0.98606418),
    (0.94997915, 0.98167057),
    (0.93997498, 0.97746413),
    (0.92997082, 0.97364491),
    (0.91996665, 0.97117764),
    (0.90996248, 0.96923602),
    (0.89995831, 0.96699240),
    (0.88995414, 0.96339118),
    (0.87994997, 0.95992709),
    (0.86994581, 0.95680774),
    (0.85994164, 0.95358181),
    (0.84993747, 0.95081947),
    (0.83993330, 0.94949890),
    (0.82992913, 0.94794136),
    (0.81992496, 0.94444460),
    (0.80992080, 0.94096295),
    (0.79991663, 0.93542647),
    (0.78991246, 0.92766603),
    (0.77990829, 0.92034371),
    (0.77032096, 0.91266835),
    (0.76031679, 0.90315400),
    (0.75031263, 0.88940173),
    (0.74030846, 0.87607069),
    (0.73030429, 0.86553880),
    (0.72030012, 0.85459455),
    (0.71029595, 0.84403972),
    (0.70029178, 0.83334723),
    (0.69028761, 0.82145199),
    (0.68028345, 0.79706850),
    (0.67027928, 0.77713764),
    (0.66027511, 0.76001590),
    (0.65027094, 0.74503378),
    (0.64026677, 0.73098919),
    (0.63026260, 0.71845612),
    (0.62025844, 0.71012602),
    (0.61025427, 0.69352779),
    (0.60025010, 0.68154918),
    (0.59024593, 0.67309595),
    (0.58024176, 0.66519119),
    (0.57023759, 0.65814812),
    (0.56023343, 0.65117078),
    (0.55022926, 0.64585065),
    (0.54022509, 0.63234040),
    (0.53022092, 0.61816153),
    (0.52021675, 0.60596687),
    (0.51021258, 0.59692546),
    (0.50020842, 0.58963299),
    (0.49020425, 0.58304799),
    (0.48020008, 0.57702268),
    (0.47019591, 0.56381486),
    (0.46019174, 0.54746345),
    (0.45018757, 0.53172050),
    (0.44018340, 0.51716893),
    (0.43017924, 0.50658032),
    (0.42017507, 0.50034625),
    (0.41017090, 0.49575291),
    (0.40016673, 0.48490544),
    (0.39016256, 0.47285137),
    (0.38015839, 0.45818663),
    (0.37015423, 0.44256068),
    (0.36015006, 0.43073483),
    (0.35014589, 0.42179066),
    (0.34014172, 0.41407793),
    (0.33013755, 0.39769835),
    (0.32013338, 0.38004691),
    (0.31012922, 0.36374012),
    (0.30012505, 0.34912866),
    (0.29012088, 0.33578118),
    (0.28011671, 0.32435675),
    (0.27011254, 0.31531430),
    (0.26010837, 0.29749416),
    (0.25010421, 0.28147755),
    (0.24010004, 0.26590185),
    (0.23009587, 0.25070030),
    (0.22009170, 0.23855386),
    (0.21008753, 0.22719853),
    (0.20008336, 0.21685800),
    (0.19007919, 0.19746327),
    (0.18007503, 0.18165433),
    (0.17007086, 0.16822235),
    (0.16006669, 0.15809769),
    (0.15006252, 0.14801574),
    (0.14005835, 0.13894838),
    (0.13005418, 0.13180976),
    (0.12005002, 0.11586423),
    (0.11004585, 0.10036346),
    (0.10004168, 0.08707941),
    (0.09003751, 0.07529754),
    (0.08003334, 0.06417509),
    (0.07002917, 0.05756066),
    (0.06002501, 0.05139899),
    (0.05002084, 0.04180092),
    (0.04001667, 0.03073830),
    (0.03001250, 0.02047374),
    (0.02000833, 0.01143276),
    (0.01000416, 0.00470214),
    (0.00000000, 0.00000000),
];
